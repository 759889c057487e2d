mod answer;
mod participant;
mod question;
mod rule;
mod session;

pub use answer::AnswerRecord;
pub use participant::{ParticipantRecord, ParticipantStatus};
pub use question::QuestionRecord;
pub use rule::{sort_rules, RuleRecord};
pub use session::{SessionRecord, SessionStatus};
