//! Data-access contracts used by the quiz engine and the auto-reply matcher.
//!
//! Every single-row read returns [`Lookup`]; every state transition on a session is a
//! compare-and-set on `(status = active, current_position = expected)` that fails with
//! [`StorageError::Conflict`] when another writer got there first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::lookup::Lookup;
use crate::models::{
    AnswerRecord, ParticipantRecord, QuestionRecord, RuleRecord, SessionRecord,
};

/// Read-only question content.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// All questions ordered by `(sequence_key, id)`.
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StorageError>;

    /// The question with the smallest sequence key strictly greater than `after`
    /// (`None` = the minimum key). Duplicate keys resolve to the smallest id.
    async fn question_after(&self, after: Option<i64>) -> Result<Lookup<QuestionRecord>, StorageError>;

    /// The question at exactly `sequence_key`, with the same duplicate tie-break as `question_after`.
    async fn question_at(&self, sequence_key: i64) -> Result<Lookup<QuestionRecord>, StorageError>;
}

/// Read-only auto-reply configuration.
#[async_trait]
pub trait RuleSet: Send + Sync {
    /// Active rules by descending priority, then creation order.
    async fn list_active_rules(&self) -> Result<Vec<RuleRecord>, StorageError>;
}

/// Participant, session and answer persistence.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_participant(&self, id: &str) -> Result<Lookup<ParticipantRecord>, StorageError>;

    /// Returns the participant, inserting a `new` one if absent.
    async fn ensure_participant(&self, id: &str) -> Result<ParticipantRecord, StorageError>;

    async fn active_session(&self, participant_id: &str) -> Result<Lookup<SessionRecord>, StorageError>;

    /// All sessions of a participant, oldest first.
    async fn list_sessions(&self, participant_id: &str) -> Result<Vec<SessionRecord>, StorageError>;

    /// Inserts an active session and marks the participant active.
    /// Fails with `AlreadyExists` if the participant already has an active session.
    async fn create_session(&self, session: &SessionRecord) -> Result<(), StorageError>;

    /// Moves an active session from `expected` to `next` and stores the running score.
    async fn advance_position(
        &self,
        session_id: &str,
        expected: Option<i64>,
        next: i64,
        running_score: i64,
    ) -> Result<(), StorageError>;

    /// Marks an active session at `expected` completed with `final_score` and adds that score
    /// to the participant's cumulative score, atomically. Returns the updated participant.
    async fn complete_session(
        &self,
        session_id: &str,
        expected: Option<i64>,
        final_score: i64,
        ended_at: DateTime<Utc>,
    ) -> Result<ParticipantRecord, StorageError>;

    /// Force-ends the participant's active session, if any.
    async fn end_active_session(
        &self,
        participant_id: &str,
        ended_at: DateTime<Utc>,
    ) -> Result<Lookup<SessionRecord>, StorageError>;

    /// Appends an answer. Fails with `AlreadyExists` for a second answer to the same question in a session.
    async fn insert_answer(&self, answer: &AnswerRecord) -> Result<(), StorageError>;

    async fn find_answer(
        &self,
        session_id: &str,
        question_id: &str,
    ) -> Result<Lookup<AnswerRecord>, StorageError>;

    /// Answers of a session, oldest first.
    async fn list_answers(&self, session_id: &str) -> Result<Vec<AnswerRecord>, StorageError>;
}
