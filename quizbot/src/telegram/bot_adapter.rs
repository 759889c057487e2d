//! Wraps teloxide::Bot and implements [`quizbot_core::Bot`].

use async_trait::async_trait;
use quizbot_core::{Bot as CoreBot, QuizbotError, Result};
use teloxide::{prelude::*, types::ChatId};
use tracing::error;

/// Creates the teloxide client, pointing it at `api_url` when given (e.g. a local Bot API server).
pub fn build_teloxide_bot(token: &str, api_url: Option<&str>) -> teloxide::Bot {
    let bot = teloxide::Bot::new(token);
    match api_url {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<()> {
        let chat_id: i64 = recipient
            .parse()
            .map_err(|_| QuizbotError::Bot(format!("Invalid Telegram chat id: {}", recipient)))?;
        self.bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map_err(|e| QuizbotError::Bot(e.to_string()))?;
        Ok(())
    }
}
