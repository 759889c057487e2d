//! Answer record: append-only, at most one per (session, question).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: String,
    pub session_id: String,
    pub question_id: String,
    pub raw_input: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl AnswerRecord {
    /// Creates a new record with a generated UUID and current timestamp.
    pub fn new(
        session_id: impl Into<String>,
        question_id: impl Into<String>,
        raw_input: impl Into<String>,
        points: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            question_id: question_id.into(),
            raw_input: raw_input.into(),
            points,
            created_at: Utc::now(),
        }
    }
}
