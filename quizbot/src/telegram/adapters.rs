use quizbot_core::{InboundMessage, ToInboundMessage};

/// Telegram message to [`InboundMessage`]: the chat is the participant, and
/// `chat_id:message_id` identifies the delivery (Telegram redelivers with the same pair).
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToInboundMessage for TelegramMessageWrapper<'a> {
    fn to_inbound(&self) -> InboundMessage {
        let chat_id = self.0.chat.id.0;
        InboundMessage {
            sender_id: chat_id.to_string(),
            text: self.0.text().unwrap_or("").to_string(),
            delivery_id: format!("{}:{}", chat_id, self.0.id.0),
            received_at: self.0.date,
        }
    }
}
