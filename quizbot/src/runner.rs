//! Turning a routing outcome into outbound text, shared by the Telegram and console runners.

use quizbot_core::{Bot, InboundMessage, QuizbotError, Result};
use tracing::{error, info, warn};

use crate::config::QuizConfig;
use crate::router::{Routed, Router};

/// User-visible texts for outcomes that are not replies.
#[derive(Debug, Clone)]
pub struct ReplyTexts {
    /// Any dependency failure.
    pub failure: String,
    /// Quiz start refused because the question bank is empty.
    pub no_quiz: String,
}

impl ReplyTexts {
    pub fn from_config(config: &QuizConfig) -> Self {
        Self {
            failure: config.failure_text.clone(),
            no_quiz: config.no_quiz_text.clone(),
        }
    }
}

/// `None` means send nothing (duplicate delivery).
pub fn outbound_text(outcome: Result<Routed>, texts: &ReplyTexts, message: &InboundMessage) -> Option<String> {
    match outcome {
        Ok(Routed::Reply(reply)) => Some(reply.text),
        Ok(Routed::Duplicate) => None,
        Err(QuizbotError::NoActiveQuestionBank) => {
            warn!(sender_id = %message.sender_id, "Quiz requested but no question bank is available");
            Some(texts.no_quiz.clone())
        }
        Err(e) => {
            error!(
                error = %e,
                transient = e.is_transient(),
                sender_id = %message.sender_id,
                delivery_id = %message.delivery_id,
                "Routing failed"
            );
            Some(texts.failure.clone())
        }
    }
}

/// Routes `message` and sends whatever should be sent back to its sender.
pub async fn process_message(
    router: &Router,
    bot: &dyn Bot,
    texts: &ReplyTexts,
    message: &InboundMessage,
) -> Result<()> {
    let outcome = router.route(message).await;
    let Some(text) = outbound_text(outcome, texts, message) else {
        return Ok(());
    };
    bot.send_message(&message.sender_id, &text).await?;
    info!(sender_id = %message.sender_id, reply_len = text.len(), "step: reply sent");
    Ok(())
}
