//! Bot configuration: BaseConfig (Telegram + log + DB) + QuizConfig (routing and quiz settings).

mod base;
mod bot_config;
mod quiz;


pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use quiz::{
    LlmFallbackConfig, QuizConfig, DEFAULT_COMPLETION_TEXT, DEFAULT_FAILURE_TEXT,
    DEFAULT_FALLBACK_TEXT, DEFAULT_NO_QUIZ_TEXT, DEFAULT_WELCOME_TEXT,
};
