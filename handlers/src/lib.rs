//! # Routing handlers
//!
//! The four routing steps as [`quizbot_core::Handler`]s, in chain order:
//! quiz continuation, quiz start, auto-reply, fallback.

mod auto_reply;
mod fallback;
mod quiz;
mod triggers;

#[cfg(test)]
mod test;

pub use auto_reply::AutoReplyHandler;
pub use fallback::{FallbackHandler, FallbackResponder, HttpFallback, StaticFallback};
pub use quiz::{QuizContinuationHandler, QuizStartHandler};
pub use triggers::{StartTriggers, TriggerMatch, BUILTIN_START_TRIGGERS};
