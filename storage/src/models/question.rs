//! Question record: read-only quiz content, ordered by sequence key.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    /// Ordering value; may have gaps or duplicates. Duplicates are ordered by `id`.
    pub sequence_key: i64,
    pub prompt: String,
    /// Valid answer tokens, compared after normalization.
    pub options: Vec<String>,
    /// When set, only this token earns `points`; other valid tokens earn 0.
    #[serde(default)]
    pub correct_token: Option<String>,
    pub points: i64,
}

impl QuestionRecord {
    pub fn new(
        id: impl Into<String>,
        sequence_key: i64,
        prompt: impl Into<String>,
        options: Vec<String>,
        points: i64,
    ) -> Self {
        Self {
            id: id.into(),
            sequence_key,
            prompt: prompt.into(),
            options,
            correct_token: None,
            points,
        }
    }

    pub fn with_correct_token(mut self, token: impl Into<String>) -> Self {
        self.correct_token = Some(token.into());
        self
    }
}
