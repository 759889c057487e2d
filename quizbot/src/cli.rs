//! CLI parser and config loading.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::BotConfig;

#[derive(Parser)]
#[command(name = "quizbot")]
#[command(about = "Quiz bot: Telegram runner, console runner, content seeding, session reset", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Route `sender: text` lines from stdin and print replies.
    Console,
    /// Replace the question bank (and optionally the auto-reply rules) from JSON files.
    Seed {
        #[arg(short, long)]
        questions: PathBuf,
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
    /// End a participant's active quiz session.
    Reset {
        #[arg(short, long)]
        sender: String,
    },
}

/// Load and validate BotConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    let config = BotConfig::load(token)?;
    config.validate()?;
    Ok(config)
}
