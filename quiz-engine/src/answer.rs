//! Answer evaluation: exact token match after normalization.

use std::fmt;
use std::str::FromStr;

use quizbot_core::{normalize, QuizbotError};
use serde::{Deserialize, Serialize};
use storage::QuestionRecord;

/// What to do with an answer that matches none of the question's tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvalidAnswerPolicy {
    /// Record a zero-point answer and move on to the next question.
    #[default]
    RecordZero,
    /// Record nothing, keep the position and ask the same question again.
    Reprompt,
}

impl FromStr for InvalidAnswerPolicy {
    type Err = QuizbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "record" | "record_zero" => Ok(InvalidAnswerPolicy::RecordZero),
            "reprompt" => Ok(InvalidAnswerPolicy::Reprompt),
            other => Err(QuizbotError::Config(format!(
                "unknown invalid answer policy '{}', expected 'record' or 'reprompt'",
                other
            ))),
        }
    }
}

impl fmt::Display for InvalidAnswerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidAnswerPolicy::RecordZero => f.write_str("record"),
            InvalidAnswerPolicy::Reprompt => f.write_str("reprompt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// One of the valid tokens; `points` already reflects `correct_token`.
    Valid { token: String, points: i64 },
    Invalid,
}

pub fn evaluate(question: &QuestionRecord, raw: &str) -> Evaluation {
    let given = normalize(raw);
    let Some(token) = question.options.iter().find(|opt| normalize(opt) == given) else {
        return Evaluation::Invalid;
    };
    let points = match &question.correct_token {
        Some(correct) if normalize(correct) != given => 0,
        _ => question.points,
    };
    Evaluation::Valid {
        token: token.clone(),
        points,
    }
}
