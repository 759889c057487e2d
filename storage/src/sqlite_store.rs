//! SQLite-backed question bank, rule set and quiz store.
//!
//! One partial unique index (`status = 'active'`) keeps at most one active session per
//! participant; session transitions are conditional UPDATEs checked by `rows_affected`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::lookup::Lookup;
use crate::models::{
    AnswerRecord, ParticipantRecord, ParticipantStatus, QuestionRecord, RuleRecord,
    SessionRecord, SessionStatus,
};
use crate::repository::{QuestionBank, QuizStore, RuleSet};
use crate::sqlite_pool::SqlitePoolManager;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS participants (
        id TEXT PRIMARY KEY,
        score INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        participant_id TEXT NOT NULL REFERENCES participants(id),
        current_position INTEGER,
        score INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL,
        started_at TEXT NOT NULL,
        ended_at TEXT
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_active ON sessions(participant_id) WHERE status = 'active'",
    "CREATE INDEX IF NOT EXISTS idx_sessions_participant ON sessions(participant_id, started_at)",
    r#"
    CREATE TABLE IF NOT EXISTS answers (
        id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL REFERENCES sessions(id),
        question_id TEXT NOT NULL,
        raw_input TEXT NOT NULL,
        points INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (session_id, question_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS questions (
        id TEXT PRIMARY KEY,
        sequence_key INTEGER NOT NULL,
        prompt TEXT NOT NULL,
        options TEXT NOT NULL,
        correct_token TEXT,
        points INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_questions_sequence ON questions(sequence_key, id)",
    r#"
    CREATE TABLE IF NOT EXISTS rules (
        id TEXT PRIMARY KEY,
        triggers TEXT NOT NULL,
        response TEXT NOT NULL,
        priority INTEGER NOT NULL,
        active INTEGER NOT NULL,
        position INTEGER NOT NULL
    )
    "#,
];

#[derive(Clone)]
pub struct SqliteStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating database tables if not exist");
        let pool = self.pool_manager.pool();
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Database tables created successfully");
        Ok(())
    }

    /// Replaces the whole question bank (content seeding).
    #[instrument(skip(self, questions))]
    pub async fn replace_questions(&self, questions: &[QuestionRecord]) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        sqlx::query("DELETE FROM questions").execute(&mut *tx).await?;
        for q in questions {
            sqlx::query(
                "INSERT INTO questions (id, sequence_key, prompt, options, correct_token, points) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&q.id)
            .bind(q.sequence_key)
            .bind(&q.prompt)
            .bind(serde_json::to_string(&q.options)?)
            .bind(&q.correct_token)
            .bind(q.points)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!(count = questions.len(), "Question bank replaced");
        Ok(())
    }

    /// Replaces all auto-reply rules (configuration seeding).
    #[instrument(skip(self, rules))]
    pub async fn replace_rules(&self, rules: &[RuleRecord]) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        sqlx::query("DELETE FROM rules").execute(&mut *tx).await?;
        for r in rules {
            sqlx::query(
                "INSERT INTO rules (id, triggers, response, priority, active, position) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&r.id)
            .bind(serde_json::to_string(&r.triggers)?)
            .bind(&r.response)
            .bind(r.priority)
            .bind(r.active)
            .bind(r.position)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        info!(count = rules.len(), "Rule set replaced");
        Ok(())
    }

    async fn load_participant(&self, id: &str) -> Result<Lookup<ParticipantRecord>, StorageError> {
        let row = sqlx::query("SELECT * FROM participants WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        row.map(|r| participant_from_row(&r)).transpose().map(Lookup::from)
    }
}

fn participant_from_row(row: &SqliteRow) -> Result<ParticipantRecord, StorageError> {
    let status: String = row.try_get("status")?;
    Ok(ParticipantRecord {
        id: row.try_get("id")?,
        score: row.try_get("score")?,
        status: status.parse::<ParticipantStatus>()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn session_from_row(row: &SqliteRow) -> Result<SessionRecord, StorageError> {
    let status: String = row.try_get("status")?;
    Ok(SessionRecord {
        id: row.try_get("id")?,
        participant_id: row.try_get("participant_id")?,
        current_position: row.try_get("current_position")?,
        score: row.try_get("score")?,
        status: status.parse::<SessionStatus>()?,
        started_at: row.try_get("started_at")?,
        ended_at: row.try_get("ended_at")?,
    })
}

fn answer_from_row(row: &SqliteRow) -> Result<AnswerRecord, StorageError> {
    Ok(AnswerRecord {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        question_id: row.try_get("question_id")?,
        raw_input: row.try_get("raw_input")?,
        points: row.try_get("points")?,
        created_at: row.try_get("created_at")?,
    })
}

fn question_from_row(row: &SqliteRow) -> Result<QuestionRecord, StorageError> {
    let options: String = row.try_get("options")?;
    Ok(QuestionRecord {
        id: row.try_get("id")?,
        sequence_key: row.try_get("sequence_key")?,
        prompt: row.try_get("prompt")?,
        options: serde_json::from_str(&options)?,
        correct_token: row.try_get("correct_token")?,
        points: row.try_get("points")?,
    })
}

fn rule_from_row(row: &SqliteRow) -> Result<RuleRecord, StorageError> {
    let triggers: String = row.try_get("triggers")?;
    Ok(RuleRecord {
        id: row.try_get("id")?,
        triggers: serde_json::from_str(&triggers)?,
        response: row.try_get("response")?,
        priority: row.try_get("priority")?,
        active: row.try_get("active")?,
        position: row.try_get("position")?,
    })
}

#[async_trait]
impl QuestionBank for SqliteStore {
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let rows = sqlx::query("SELECT * FROM questions ORDER BY sequence_key ASC, id ASC")
            .fetch_all(self.pool_manager.pool())
            .await?;
        rows.iter().map(question_from_row).collect()
    }

    async fn question_after(&self, after: Option<i64>) -> Result<Lookup<QuestionRecord>, StorageError> {
        let query = match after {
            Some(key) => sqlx::query(
                "SELECT * FROM questions WHERE sequence_key > ? ORDER BY sequence_key ASC, id ASC LIMIT 1",
            )
            .bind(key),
            None => sqlx::query("SELECT * FROM questions ORDER BY sequence_key ASC, id ASC LIMIT 1"),
        };
        let row = query.fetch_optional(self.pool_manager.pool()).await?;
        row.map(|r| question_from_row(&r)).transpose().map(Lookup::from)
    }

    async fn question_at(&self, sequence_key: i64) -> Result<Lookup<QuestionRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM questions WHERE sequence_key = ? ORDER BY id ASC LIMIT 1",
        )
        .bind(sequence_key)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        row.map(|r| question_from_row(&r)).transpose().map(Lookup::from)
    }
}

#[async_trait]
impl RuleSet for SqliteStore {
    async fn list_active_rules(&self) -> Result<Vec<RuleRecord>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM rules WHERE active = 1 ORDER BY priority DESC, position ASC, id ASC",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;
        rows.iter().map(rule_from_row).collect()
    }
}

#[async_trait]
impl QuizStore for SqliteStore {
    async fn find_participant(&self, id: &str) -> Result<Lookup<ParticipantRecord>, StorageError> {
        self.load_participant(id).await
    }

    async fn ensure_participant(&self, id: &str) -> Result<ParticipantRecord, StorageError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO participants (id, score, status, created_at, updated_at) VALUES (?, 0, ?, ?, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(ParticipantStatus::New.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool_manager.pool())
        .await?;

        match self.load_participant(id).await? {
            Lookup::Found(p) => Ok(p),
            Lookup::NotFound => Err(StorageError::NotFound(format!("participant {}", id))),
        }
    }

    async fn active_session(&self, participant_id: &str) -> Result<Lookup<SessionRecord>, StorageError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE participant_id = ? AND status = 'active'")
            .bind(participant_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        row.map(|r| session_from_row(&r)).transpose().map(Lookup::from)
    }

    async fn list_sessions(&self, participant_id: &str) -> Result<Vec<SessionRecord>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM sessions WHERE participant_id = ? ORDER BY started_at ASC, rowid ASC",
        )
        .bind(participant_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        rows.iter().map(session_from_row).collect()
    }

    async fn create_session(&self, session: &SessionRecord) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO sessions (id, participant_id, current_position, score, status, started_at, ended_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.participant_id)
        .bind(session.current_position)
        .bind(session.score)
        .bind(session.status.as_str())
        .bind(session.started_at)
        .bind(session.ended_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE participants SET status = ?, updated_at = ? WHERE id = ?")
            .bind(ParticipantStatus::Active.as_str())
            .bind(Utc::now())
            .bind(&session.participant_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(session_id = %session.id, participant_id = %session.participant_id, "Session created");
        Ok(())
    }

    async fn advance_position(
        &self,
        session_id: &str,
        expected: Option<i64>,
        next: i64,
        running_score: i64,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE sessions SET current_position = ?, score = ? WHERE id = ? AND status = 'active' AND current_position IS ?",
        )
        .bind(next)
        .bind(running_score)
        .bind(session_id)
        .bind(expected)
        .execute(self.pool_manager.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict(format!(
                "session {} is no longer active at position {:?}",
                session_id, expected
            )));
        }
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: &str,
        expected: Option<i64>,
        final_score: i64,
        ended_at: DateTime<Utc>,
    ) -> Result<ParticipantRecord, StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        let result = sqlx::query(
            "UPDATE sessions SET status = 'completed', score = ?, ended_at = ? WHERE id = ? AND status = 'active' AND current_position IS ?",
        )
        .bind(final_score)
        .bind(ended_at)
        .bind(session_id)
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict(format!(
                "session {} is no longer active at position {:?}",
                session_id, expected
            )));
        }

        let participant_id: String = sqlx::query_scalar("SELECT participant_id FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE participants SET score = score + ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(final_score)
        .bind(ParticipantStatus::Completed.as_str())
        .bind(ended_at)
        .bind(&participant_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query("SELECT * FROM participants WHERE id = ?")
            .bind(&participant_id)
            .fetch_one(&mut *tx)
            .await?;
        let participant = participant_from_row(&row)?;
        tx.commit().await?;
        Ok(participant)
    }

    async fn end_active_session(
        &self,
        participant_id: &str,
        ended_at: DateTime<Utc>,
    ) -> Result<Lookup<SessionRecord>, StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        let row = sqlx::query("SELECT * FROM sessions WHERE participant_id = ? AND status = 'active'")
            .bind(participant_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(Lookup::NotFound);
        };
        let mut session = session_from_row(&row)?;

        sqlx::query("UPDATE sessions SET status = 'ended', ended_at = ? WHERE id = ? AND status = 'active'")
            .bind(ended_at)
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE participants SET status = ?, updated_at = ? WHERE id = ?")
            .bind(ParticipantStatus::Ended.as_str())
            .bind(ended_at)
            .bind(participant_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        session.status = SessionStatus::Ended;
        session.ended_at = Some(ended_at);
        Ok(Lookup::Found(session))
    }

    async fn insert_answer(&self, answer: &AnswerRecord) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO answers (id, session_id, question_id, raw_input, points, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&answer.id)
        .bind(&answer.session_id)
        .bind(&answer.question_id)
        .bind(&answer.raw_input)
        .bind(answer.points)
        .bind(answer.created_at)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    async fn find_answer(
        &self,
        session_id: &str,
        question_id: &str,
    ) -> Result<Lookup<AnswerRecord>, StorageError> {
        let row = sqlx::query("SELECT * FROM answers WHERE session_id = ? AND question_id = ?")
            .bind(session_id)
            .bind(question_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        row.map(|r| answer_from_row(&r)).transpose().map(Lookup::from)
    }

    async fn list_answers(&self, session_id: &str) -> Result<Vec<AnswerRecord>, StorageError> {
        let rows = sqlx::query("SELECT * FROM answers WHERE session_id = ? ORDER BY created_at ASC, rowid ASC")
            .bind(session_id)
            .fetch_all(self.pool_manager.pool())
            .await?;
        rows.iter().map(answer_from_row).collect()
    }
}
