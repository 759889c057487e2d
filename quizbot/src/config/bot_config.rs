//! BotConfig: BaseConfig + QuizConfig. Use load() for env-based loading.

use anyhow::Result;

use super::{BaseConfig, QuizConfig};

pub struct BotConfig {
    pub base: BaseConfig,
    pub quiz: QuizConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    /// Call validate() after load to check config before init.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let quiz = QuizConfig::from_env()?;
        Ok(Self { base, quiz })
    }

    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.quiz.validate()
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }
    pub fn quiz(&self) -> &QuizConfig {
        &self.quiz
    }

    /// Token for the Telegram runner; errors when neither `--token` nor BOT_TOKEN was given.
    pub fn require_token(&self) -> Result<&str> {
        self.base
            .bot_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("BOT_TOKEN not set (or pass --token)"))
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }
}
