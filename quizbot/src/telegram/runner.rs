//! REPL runner: converts teloxide messages to InboundMessage and hands them to per-sender lanes.

use anyhow::Result;
use quizbot_core::ToInboundMessage;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, info, instrument};

use super::adapters::TelegramMessageWrapper;
use super::bot_adapter::TelegramBotAdapter;
use crate::router::Router;
use crate::queue::SenderQueues;
use crate::runner::ReplyTexts;

#[instrument(skip(bot, router, texts))]
pub async fn run_repl(bot: teloxide::Bot, router: Arc<Router>, texts: ReplyTexts) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        if let Some(username) = &me.user.username {
            info!(username = %username, "Connected to Telegram");
        }
    }

    let adapter: Arc<dyn quizbot_core::Bot> = Arc::new(TelegramBotAdapter::new(bot.clone()));
    let queues = SenderQueues::new(router, adapter, texts);

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let queues = queues.clone();

        async move {
            if msg.text().is_none() {
                debug!(chat_id = msg.chat.id.0, "Ignoring non-text message");
                return Ok(());
            }
            // Lanes keep one chat's messages in arrival order without blocking the REPL.
            queues.enqueue(TelegramMessageWrapper(&msg).to_inbound());
            Ok(())
        }
    })
    .await;

    Ok(())
}
