//! Storage error types.
//!
//! Used by repository implementations and callers of storage APIs.

use quizbot_core::{HandlerError, QuizbotError};
use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// A compare-and-set saw a different state than the caller expected.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::AlreadyExists(db.message().to_string())
            }
            sqlx::Error::RowNotFound => StorageError::NotFound("row".to_string()),
            sqlx::Error::Io(e) => StorageError::Unavailable(e.to_string()),
            sqlx::Error::PoolTimedOut => StorageError::Unavailable("pool timed out".to_string()),
            sqlx::Error::PoolClosed => StorageError::Unavailable("pool closed".to_string()),
            other => StorageError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}

impl From<StorageError> for QuizbotError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(msg) => QuizbotError::ConcurrentModification(msg),
            StorageError::Database(msg) | StorageError::Unavailable(msg) => {
                QuizbotError::StorageUnavailable(msg)
            }
            StorageError::Corrupt(msg) => QuizbotError::StorageUnavailable(format!("corrupt record: {}", msg)),
            StorageError::NotFound(msg) | StorageError::AlreadyExists(msg) => {
                QuizbotError::Handler(HandlerError::State(msg))
            }
        }
    }
}
