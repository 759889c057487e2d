//! Command entry points: each initializes logging, opens the store and runs one command.

use anyhow::Result;
use quiz_engine::{EngineSettings, QuizEngine};
use quizbot_core::init_tracing;
use std::path::Path;
use storage::Lookup;
use tokio::io::BufReader;
use tracing::{info, instrument};

use crate::components::{build_bot_components, open_store};
use crate::config::BotConfig;
use crate::console::{run_console, ConsoleBot};
use crate::runner::ReplyTexts;
use crate::seed::seed_store;
use crate::telegram::{build_teloxide_bot, run_repl};

/// Main entry for `run`: init logging, build components, then run the Telegram REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    let token = config.require_token()?.to_string();
    init_tracing(config.log_file())?;

    info!(database_url = %config.database_url(), "Initializing bot");
    let components = build_bot_components(&config).await?;
    let bot = build_teloxide_bot(&token, config.telegram_api_url());

    info!("Bot started successfully");
    run_repl(bot, components.router, ReplyTexts::from_config(config.quiz())).await
}

#[instrument(skip(config))]
pub async fn run_console_stdio(config: BotConfig) -> Result<()> {
    init_tracing(config.log_file())?;
    let components = build_bot_components(&config).await?;
    let texts = ReplyTexts::from_config(config.quiz());
    let bot = ConsoleBot::new(tokio::io::stdout());
    let input = BufReader::new(tokio::io::stdin());
    let routed = run_console(&components.router, &texts, input, &bot).await?;
    info!(routed = routed, "Console input closed");
    Ok(())
}

pub async fn seed(config: BotConfig, questions: &Path, rules: Option<&Path>) -> Result<()> {
    init_tracing(config.log_file())?;
    let store = open_store(&config).await?;
    seed_store(&store, questions, rules).await
}

/// Administrative reset: ends the sender's active session so the next start trigger begins anew.
pub async fn reset(config: BotConfig, sender: &str) -> Result<()> {
    init_tracing(config.log_file())?;
    let store = open_store(&config).await?;
    let settings = EngineSettings {
        storage_timeout: config.quiz().storage_timeout,
        ..EngineSettings::default()
    };
    let engine = QuizEngine::new(store.clone(), store, settings);
    match engine.end(sender).await? {
        Lookup::Found(session) => {
            info!(sender = %sender, session_id = %session.id, "Active session ended");
            println!("Ended session {} for {}", session.id, sender);
        }
        Lookup::NotFound => {
            println!("No active session for {}", sender);
        }
    }
    Ok(())
}
