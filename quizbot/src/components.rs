//! Component factory: builds the store and Router from config. Isolates assembly logic from the runners.

use anyhow::Result;
use auto_reply::AutoReplyMatcher;
use handlers::{
    FallbackHandler, FallbackResponder, HttpFallback, StartTriggers, StaticFallback, TriggerMatch,
};
use middleware::Deduplicator;
use quiz_engine::{EngineSettings, QuizEngine, QuizMessages};
use std::sync::Arc;
use storage::{QuestionBank, QuizStore, RuleSet, SqliteStore};
use tracing::{error, info, instrument};

use crate::config::{BotConfig, QuizConfig};
use crate::router::Router;

pub struct BotComponents {
    pub store: Arc<SqliteStore>,
    pub router: Arc<Router>,
}

/// Opens the SQLite store (creating the schema if needed).
#[instrument(skip(config))]
pub async fn open_store(config: &BotConfig) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::new(config.database_url()).await.map_err(|e| {
        error!(
            error = %e,
            database_url = %config.database_url(),
            "Failed to initialize quiz storage"
        );
        anyhow::anyhow!("Failed to initialize quiz storage: {}", e)
    })?;
    Ok(Arc::new(store))
}

#[instrument(skip(config))]
pub async fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let store = open_store(config).await?;
    let router = Arc::new(build_router(config.quiz(), store.clone())?);
    Ok(BotComponents { store, router })
}

/// Builds the Router over any store that serves questions, rules and quiz state.
pub fn build_router<S>(config: &QuizConfig, store: Arc<S>) -> Result<Router>
where
    S: QuizStore + QuestionBank + RuleSet + 'static,
{
    let settings = EngineSettings {
        policy: config.invalid_answer_policy,
        messages: QuizMessages {
            welcome: config.welcome_text.clone(),
            completion: config.completion_text.clone(),
            ..QuizMessages::default()
        },
        storage_timeout: config.storage_timeout,
    };
    let engine = Arc::new(QuizEngine::new(store.clone(), store.clone(), settings));
    let matcher = Arc::new(AutoReplyMatcher::new(store, config.storage_timeout));
    let mode = if config.start_triggers_whole_words {
        TriggerMatch::WholeWords
    } else {
        TriggerMatch::Substring
    };
    let triggers = StartTriggers::with_additions(&config.extra_start_triggers).with_mode(mode);

    let responder: Arc<dyn FallbackResponder> = match &config.llm_fallback {
        Some(llm) => {
            info!(base_url = %llm.base_url, model = %llm.model, "Using HTTP fallback responder");
            Arc::new(HttpFallback::new(
                &llm.base_url,
                llm.api_key.clone(),
                llm.model.clone(),
            )?)
        }
        None => Arc::new(StaticFallback::new(config.fallback_text.clone())),
    };

    info!(
        policy = %config.invalid_answer_policy,
        dedup_window_secs = config.dedup_window.as_secs(),
        triggers = triggers.triggers().len(),
        trigger_match = ?triggers.mode(),
        "Router assembled"
    );

    Ok(Router::new(
        engine,
        matcher,
        triggers,
        FallbackHandler::new(responder, config.fallback_timeout),
        Deduplicator::new(config.dedup_window),
    ))
}
