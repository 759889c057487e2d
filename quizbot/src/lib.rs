//! # Quiz bot application
//!
//! Wires storage, the quiz engine, the auto-reply matcher and the routing handlers into a
//! [`Router`], and runs it behind Telegram or the console. Config comes from the environment.

pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod console;
pub mod locks;
pub mod queue;
pub mod router;
pub mod runner;
pub mod seed;
pub mod telegram;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, build_router, open_store, BotComponents};
pub use config::{BaseConfig, BotConfig, LlmFallbackConfig, QuizConfig};
pub use console::{parse_line, run_console, ConsoleBot};
pub use locks::ParticipantLocks;
pub use queue::SenderQueues;
pub use router::{Routed, Router};
pub use runner::{outbound_text, process_message, ReplyTexts};
pub use telegram::{run_repl, TelegramBotAdapter, TelegramMessageWrapper};
