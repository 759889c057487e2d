use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizbotError {
    /// The question bank has no question to deliver. Never used for "participant answered everything".
    #[error("No active question bank")]
    NoActiveQuestionBank,

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Timed out after {after:?}: {operation}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizbotError {
    /// True for failures that may succeed on a later attempt with fresh state.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            QuizbotError::ConcurrentModification(_)
                | QuizbotError::StorageUnavailable(_)
                | QuizbotError::Timeout { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("State error: {0}")]
    State(String),

    #[error("Fallback responder failed: {0}")]
    Fallback(String),
}

pub type Result<T> = std::result::Result<T, QuizbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(QuizbotError::ConcurrentModification("s1".into()).is_transient());
        assert!(QuizbotError::StorageUnavailable("down".into()).is_transient());
        assert!(QuizbotError::Timeout {
            operation: "load_session",
            after: Duration::from_millis(10)
        }
        .is_transient());
        assert!(!QuizbotError::NoActiveQuestionBank.is_transient());
        assert!(!QuizbotError::Config("bad".into()).is_transient());
    }

    #[test]
    fn test_no_question_bank_message_is_distinct() {
        let msg = QuizbotError::NoActiveQuestionBank.to_string();
        assert_eq!(msg, "No active question bank");
    }
}
