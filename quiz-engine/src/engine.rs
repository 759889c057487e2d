//! Quiz session state machine over [`QuizStore`] and [`QuestionBank`].
//!
//! A session's `current_position` is the sequence key of the question being asked, or `None`
//! while the first question is outstanding. Every transition is a compare-and-set on that
//! position, so two deliveries racing on one session cannot both advance it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quizbot_core::{bounded, QuizbotError, Result};
use storage::{
    AnswerRecord, Lookup, QuestionBank, QuestionRecord, QuizStore, SessionRecord, StorageError,
};
use tracing::{info, instrument, warn};

use crate::answer::{evaluate, Evaluation, InvalidAnswerPolicy};
use crate::messages::{render_question, QuizMessages};
use crate::retry::retry_on_conflict;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub policy: InvalidAnswerPolicy,
    pub messages: QuizMessages,
    /// Upper bound for each storage call.
    pub storage_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            policy: InvalidAnswerPolicy::default(),
            messages: QuizMessages::default(),
            storage_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// A new session was created; the reply carries the welcome and first question.
    Started,
    /// The participant already had an active session; the reply repeats its current question.
    Resumed,
    /// The answer was recorded and the session moved to `position`.
    Advanced { position: i64 },
    /// Invalid answer under [`InvalidAnswerPolicy::Reprompt`]; nothing was written.
    Reprompted,
    /// The last question was answered. `total_score` is the participant's cumulative score.
    Completed { final_score: i64, total_score: i64 },
}

#[derive(Debug, Clone)]
pub struct QuizReply {
    pub session_id: String,
    pub text: String,
    pub event: QuizEvent,
}

pub struct QuizEngine {
    store: Arc<dyn QuizStore>,
    bank: Arc<dyn QuestionBank>,
    settings: EngineSettings,
}

impl QuizEngine {
    pub fn new(store: Arc<dyn QuizStore>, bank: Arc<dyn QuestionBank>, settings: EngineSettings) -> Self {
        Self {
            store,
            bank,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    async fn io<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, StorageError>>,
    {
        bounded(operation, self.settings.storage_timeout, async {
            fut.await.map_err(QuizbotError::from)
        })
        .await
    }

    /// Like [`Self::io`] but hands the raw storage outcome back so callers can branch on
    /// `AlreadyExists`. Only the timeout is mapped.
    async fn io_raw<T, F>(&self, operation: &'static str, fut: F) -> Result<std::result::Result<T, StorageError>>
    where
        F: Future<Output = std::result::Result<T, StorageError>>,
    {
        bounded(operation, self.settings.storage_timeout, async { Ok(fut.await) }).await
    }

    pub async fn active_session(&self, participant_id: &str) -> Result<Lookup<SessionRecord>> {
        self.io("active_session", self.store.active_session(participant_id))
            .await
    }

    /// Starts a quiz for `participant_id`. With a session already active this creates nothing
    /// and repeats the current question instead.
    #[instrument(skip(self))]
    pub async fn start(&self, participant_id: &str) -> Result<QuizReply> {
        retry_on_conflict("start", || async move { self.start_once(participant_id).await }).await
    }

    async fn start_once(&self, participant_id: &str) -> Result<QuizReply> {
        if let Lookup::Found(session) = self.active_session(participant_id).await? {
            return self.resume(session).await;
        }

        let first = match self.io("question_after", self.bank.question_after(None)).await? {
            Lookup::Found(question) => question,
            Lookup::NotFound => {
                warn!(participant_id = %participant_id, "step: quiz start refused, question bank is empty");
                return Err(QuizbotError::NoActiveQuestionBank);
            }
        };

        self.io("ensure_participant", self.store.ensure_participant(participant_id))
            .await?;

        let session = SessionRecord::start(participant_id);
        match self
            .io_raw("create_session", self.store.create_session(&session))
            .await?
        {
            Ok(()) => {}
            Err(StorageError::AlreadyExists(_)) => {
                info!(participant_id = %participant_id, "step: concurrent start, resuming existing session");
                return match self.active_session(participant_id).await? {
                    Lookup::Found(existing) => self.resume(existing).await,
                    Lookup::NotFound => Err(QuizbotError::ConcurrentModification(format!(
                        "active session for {} vanished during start",
                        participant_id
                    ))),
                };
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            participant_id = %participant_id,
            session_id = %session.id,
            first_key = first.sequence_key,
            "step: quiz session started"
        );
        Ok(QuizReply {
            session_id: session.id,
            text: self.settings.messages.welcome_text(&first),
            event: QuizEvent::Started,
        })
    }

    async fn resume(&self, session: SessionRecord) -> Result<QuizReply> {
        match self.current_question(&session).await? {
            Lookup::Found(question) => Ok(QuizReply {
                session_id: session.id,
                text: render_question(&question),
                event: QuizEvent::Resumed,
            }),
            Lookup::NotFound => Err(QuizbotError::NoActiveQuestionBank),
        }
    }

    /// Force-ends the active session. Returns the ended session, or `NotFound` if there was none.
    #[instrument(skip(self))]
    pub async fn end(&self, participant_id: &str) -> Result<Lookup<SessionRecord>> {
        let ended = self
            .io(
                "end_active_session",
                self.store.end_active_session(participant_id, Utc::now()),
            )
            .await?;
        if let Lookup::Found(session) = &ended {
            info!(participant_id = %participant_id, session_id = %session.id, "step: quiz session ended");
        }
        Ok(ended)
    }

    /// Applies `raw` to the participant's active session, reloading and retrying once on a
    /// concurrent modification. `NotFound` means the participant has no active session.
    #[instrument(skip(self, raw))]
    pub async fn answer(&self, participant_id: &str, raw: &str) -> Result<Lookup<QuizReply>> {
        retry_on_conflict("answer", || async move {
            match self.active_session(participant_id).await? {
                Lookup::Found(session) => self.advance(&session, raw).await.map(Lookup::Found),
                Lookup::NotFound => Ok(Lookup::NotFound),
            }
        })
        .await
    }

    /// The question at the session's position, or the first one after it if that key is gone.
    async fn current_question(&self, session: &SessionRecord) -> Result<Lookup<QuestionRecord>> {
        match session.current_position {
            None => self.io("question_after", self.bank.question_after(None)).await,
            Some(key) => match self.io("question_at", self.bank.question_at(key)).await? {
                Lookup::Found(question) => Ok(Lookup::Found(question)),
                Lookup::NotFound => {
                    warn!(session_id = %session.id, position = key, "step: current question missing, using next key");
                    self.io("question_after", self.bank.question_after(Some(key)))
                        .await
                }
            },
        }
    }

    /// Records `raw` against the session's current question and moves to the next one, or
    /// completes the session when no question with a greater key exists.
    pub async fn advance(&self, session: &SessionRecord, raw: &str) -> Result<QuizReply> {
        let question = match self.current_question(session).await? {
            Lookup::Found(question) => question,
            Lookup::NotFound if session.current_position.is_none() => {
                return Err(QuizbotError::NoActiveQuestionBank);
            }
            Lookup::NotFound => return self.complete(session).await,
        };

        let points = match evaluate(&question, raw) {
            Evaluation::Valid { points, .. } => points,
            Evaluation::Invalid => match self.settings.policy {
                InvalidAnswerPolicy::Reprompt => {
                    info!(session_id = %session.id, question_id = %question.id, "step: invalid answer, re-prompting");
                    return Ok(QuizReply {
                        session_id: session.id.clone(),
                        text: self.settings.messages.reprompt_text(&question),
                        event: QuizEvent::Reprompted,
                    });
                }
                InvalidAnswerPolicy::RecordZero => {
                    info!(session_id = %session.id, question_id = %question.id, "step: invalid answer, recording zero");
                    0
                }
            },
        };

        let answer = AnswerRecord::new(&session.id, &question.id, raw.trim(), points);
        let points = match self
            .io_raw("insert_answer", self.store.insert_answer(&answer))
            .await?
        {
            Ok(()) => points,
            // First answer wins; a re-submission only continues progression.
            Err(StorageError::AlreadyExists(_)) => {
                match self
                    .io("find_answer", self.store.find_answer(&session.id, &question.id))
                    .await?
                {
                    Lookup::Found(existing) => {
                        info!(session_id = %session.id, question_id = %question.id, "step: question already answered, keeping first answer");
                        existing.points
                    }
                    Lookup::NotFound => {
                        return Err(QuizbotError::ConcurrentModification(format!(
                            "answer for {} in {} vanished",
                            question.id, session.id
                        )));
                    }
                }
            }
            Err(e) => return Err(e.into()),
        };

        let next = self
            .io(
                "question_after",
                self.bank.question_after(Some(question.sequence_key)),
            )
            .await?;
        match next {
            Lookup::Found(next) => {
                self.io(
                    "advance_position",
                    self.store.advance_position(
                        &session.id,
                        session.current_position,
                        next.sequence_key,
                        session.score + points,
                    ),
                )
                .await?;
                info!(session_id = %session.id, position = next.sequence_key, points = points, "step: quiz advanced");
                Ok(QuizReply {
                    session_id: session.id.clone(),
                    text: render_question(&next),
                    event: QuizEvent::Advanced {
                        position: next.sequence_key,
                    },
                })
            }
            Lookup::NotFound => self.complete(session).await,
        }
    }

    /// Final score is the sum of the session's recorded answers, not the running score.
    async fn complete(&self, session: &SessionRecord) -> Result<QuizReply> {
        let answers = self
            .io("list_answers", self.store.list_answers(&session.id))
            .await?;
        let final_score: i64 = answers.iter().map(|a| a.points).sum();
        let participant = self
            .io(
                "complete_session",
                self.store.complete_session(
                    &session.id,
                    session.current_position,
                    final_score,
                    Utc::now(),
                ),
            )
            .await?;
        info!(
            session_id = %session.id,
            participant_id = %participant.id,
            final_score = final_score,
            total_score = participant.score,
            "step: quiz completed"
        );
        Ok(QuizReply {
            session_id: session.id.clone(),
            text: self.settings.messages.completion_text(final_score),
            event: QuizEvent::Completed {
                final_score,
                total_score: participant.score,
            },
        })
    }
}
