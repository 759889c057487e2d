//! Quiz engine: starts, advances, completes and ends quiz sessions.
//!
//! Question order is never cached: the next question is always the one with the smallest
//! sequence key strictly greater than the session's position, read live from the bank.

mod answer;
mod engine;
mod messages;
mod retry;

pub use answer::{evaluate, Evaluation, InvalidAnswerPolicy};
pub use engine::{EngineSettings, QuizEngine, QuizEvent, QuizReply};
pub use messages::{render_question, QuizMessages};
pub use retry::retry_on_conflict;
