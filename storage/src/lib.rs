//! Storage crate: quiz persistence and data-access contracts.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`lookup`] – `Lookup<T>`: explicit Found / NotFound single-row result
//! - [`models`] – Participant, Session, Answer, Question and Rule records
//! - [`repository`] – `QuestionBank`, `RuleSet`, `QuizStore` traits
//! - [`sqlite_store`] – SQLite implementation
//! - [`inmemory_store`] – in-memory implementation for tests and development
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod inmemory_store;
mod lookup;
mod models;
mod repository;
mod sqlite_pool;
mod sqlite_store;

pub use error::StorageError;
pub use inmemory_store::InMemoryStore;
pub use lookup::Lookup;
pub use models::{
    sort_rules, AnswerRecord, ParticipantRecord, ParticipantStatus, QuestionRecord, RuleRecord,
    SessionRecord, SessionStatus,
};
pub use repository::{QuestionBank, QuizStore, RuleSet};
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_store::SqliteStore;
