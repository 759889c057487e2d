use async_trait::async_trait;
use quizbot_core::{HandlerResponse, InboundMessage, Middleware, Result};
use tracing::{debug, info, instrument};

/// Logs each inbound message in before() and the routing result in after(); always continues.
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &InboundMessage) -> Result<bool> {
        info!(
            sender_id = %message.sender_id,
            delivery_id = %message.delivery_id,
            text_len = message.text.len(),
            received_at = %message.received_at,
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &InboundMessage, response: &HandlerResponse) -> Result<()> {
        let source = match response {
            HandlerResponse::Reply(reply) => Some(reply.source),
            _ => None,
        };
        debug!(
            sender_id = %message.sender_id,
            delivery_id = %message.delivery_id,
            reply_source = ?source,
            "Processed message"
        );
        Ok(())
    }
}
