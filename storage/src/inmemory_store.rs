//! # In-memory store
//!
//! Implements [`QuestionBank`], [`RuleSet`] and [`QuizStore`] over a single `RwLock`-guarded
//! state, with the same compare-and-set semantics as the SQLite store.
//!
//! Data is lost on restart; use it for tests and local development.
//! [`InMemoryStore::set_available`] simulates an unreachable backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::lookup::Lookup;
use crate::models::{
    sort_rules, AnswerRecord, ParticipantRecord, ParticipantStatus, QuestionRecord, RuleRecord,
    SessionRecord, SessionStatus,
};
use crate::repository::{QuestionBank, QuizStore, RuleSet};

#[derive(Debug, Default)]
struct State {
    participants: HashMap<String, ParticipantRecord>,
    sessions: Vec<SessionRecord>,
    answers: Vec<AnswerRecord>,
    questions: Vec<QuestionRecord>,
    rules: Vec<RuleRecord>,
}

#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Creates a store pre-loaded with content.
    pub fn seeded(questions: Vec<QuestionRecord>, rules: Vec<RuleRecord>) -> Self {
        let mut state = State {
            questions,
            rules,
            ..State::default()
        };
        sort_questions(&mut state.questions);
        sort_rules(&mut state.rules);
        Self {
            state: Arc::new(RwLock::new(state)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    pub async fn replace_questions(&self, mut questions: Vec<QuestionRecord>) {
        sort_questions(&mut questions);
        self.state.write().await.questions = questions;
    }

    pub async fn replace_rules(&self, mut rules: Vec<RuleRecord>) {
        sort_rules(&mut rules);
        self.state.write().await.rules = rules;
    }

    /// When false every call fails with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("in-memory store disabled".to_string()))
        }
    }
}

fn sort_questions(questions: &mut [QuestionRecord]) {
    questions.sort_by(|a, b| a.sequence_key.cmp(&b.sequence_key).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl QuestionBank for InMemoryStore {
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        self.check()?;
        Ok(self.state.read().await.questions.clone())
    }

    async fn question_after(&self, after: Option<i64>) -> Result<Lookup<QuestionRecord>, StorageError> {
        self.check()?;
        let state = self.state.read().await;
        let found = state
            .questions
            .iter()
            .find(|q| after.map_or(true, |key| q.sequence_key > key))
            .cloned();
        Ok(found.into())
    }

    async fn question_at(&self, sequence_key: i64) -> Result<Lookup<QuestionRecord>, StorageError> {
        self.check()?;
        let state = self.state.read().await;
        let found = state
            .questions
            .iter()
            .find(|q| q.sequence_key == sequence_key)
            .cloned();
        Ok(found.into())
    }
}

#[async_trait]
impl RuleSet for InMemoryStore {
    async fn list_active_rules(&self) -> Result<Vec<RuleRecord>, StorageError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state.rules.iter().filter(|r| r.active).cloned().collect())
    }
}

#[async_trait]
impl QuizStore for InMemoryStore {
    async fn find_participant(&self, id: &str) -> Result<Lookup<ParticipantRecord>, StorageError> {
        self.check()?;
        Ok(self.state.read().await.participants.get(id).cloned().into())
    }

    async fn ensure_participant(&self, id: &str) -> Result<ParticipantRecord, StorageError> {
        self.check()?;
        let mut state = self.state.write().await;
        Ok(state
            .participants
            .entry(id.to_string())
            .or_insert_with(|| ParticipantRecord::new(id))
            .clone())
    }

    async fn active_session(&self, participant_id: &str) -> Result<Lookup<SessionRecord>, StorageError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .sessions
            .iter()
            .find(|s| s.participant_id == participant_id && s.is_active())
            .cloned()
            .into())
    }

    async fn list_sessions(&self, participant_id: &str) -> Result<Vec<SessionRecord>, StorageError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .sessions
            .iter()
            .filter(|s| s.participant_id == participant_id)
            .cloned()
            .collect())
    }

    async fn create_session(&self, session: &SessionRecord) -> Result<(), StorageError> {
        self.check()?;
        let mut state = self.state.write().await;
        if !state.participants.contains_key(&session.participant_id) {
            return Err(StorageError::NotFound(format!(
                "participant {}",
                session.participant_id
            )));
        }
        if state
            .sessions
            .iter()
            .any(|s| s.participant_id == session.participant_id && s.is_active())
        {
            return Err(StorageError::AlreadyExists(format!(
                "active session for {}",
                session.participant_id
            )));
        }
        state.sessions.push(session.clone());
        if let Some(p) = state.participants.get_mut(&session.participant_id) {
            p.status = ParticipantStatus::Active;
            p.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn advance_position(
        &self,
        session_id: &str,
        expected: Option<i64>,
        next: i64,
        running_score: i64,
    ) -> Result<(), StorageError> {
        self.check()?;
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.is_active() && s.current_position == expected)
            .ok_or_else(|| {
                StorageError::Conflict(format!(
                    "session {} is no longer active at position {:?}",
                    session_id, expected
                ))
            })?;
        session.current_position = Some(next);
        session.score = running_score;
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: &str,
        expected: Option<i64>,
        final_score: i64,
        ended_at: DateTime<Utc>,
    ) -> Result<ParticipantRecord, StorageError> {
        self.check()?;
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.is_active() && s.current_position == expected)
            .ok_or_else(|| {
                StorageError::Conflict(format!(
                    "session {} is no longer active at position {:?}",
                    session_id, expected
                ))
            })?;
        session.status = SessionStatus::Completed;
        session.score = final_score;
        session.ended_at = Some(ended_at);
        let participant_id = session.participant_id.clone();

        let participant = state
            .participants
            .get_mut(&participant_id)
            .ok_or_else(|| StorageError::NotFound(format!("participant {}", participant_id)))?;
        participant.score += final_score;
        participant.status = ParticipantStatus::Completed;
        participant.updated_at = ended_at;
        Ok(participant.clone())
    }

    async fn end_active_session(
        &self,
        participant_id: &str,
        ended_at: DateTime<Utc>,
    ) -> Result<Lookup<SessionRecord>, StorageError> {
        self.check()?;
        let mut state = self.state.write().await;
        let Some(session) = state
            .sessions
            .iter_mut()
            .find(|s| s.participant_id == participant_id && s.is_active())
        else {
            return Ok(Lookup::NotFound);
        };
        session.status = SessionStatus::Ended;
        session.ended_at = Some(ended_at);
        let ended = session.clone();
        if let Some(p) = state.participants.get_mut(participant_id) {
            p.status = ParticipantStatus::Ended;
            p.updated_at = ended_at;
        }
        Ok(Lookup::Found(ended))
    }

    async fn insert_answer(&self, answer: &AnswerRecord) -> Result<(), StorageError> {
        self.check()?;
        let mut state = self.state.write().await;
        if state
            .answers
            .iter()
            .any(|a| a.session_id == answer.session_id && a.question_id == answer.question_id)
        {
            return Err(StorageError::AlreadyExists(format!(
                "answer for question {} in session {}",
                answer.question_id, answer.session_id
            )));
        }
        state.answers.push(answer.clone());
        Ok(())
    }

    async fn find_answer(
        &self,
        session_id: &str,
        question_id: &str,
    ) -> Result<Lookup<AnswerRecord>, StorageError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .answers
            .iter()
            .find(|a| a.session_id == session_id && a.question_id == question_id)
            .cloned()
            .into())
    }

    async fn list_answers(&self, session_id: &str) -> Result<Vec<AnswerRecord>, StorageError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .answers
            .iter()
            .filter(|a| a.session_id == session_id)
            .cloned()
            .collect())
    }
}
