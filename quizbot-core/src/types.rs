//! Core types: inbound message, reply, handler response, and the Handler / Middleware traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized inbound delivery handed over by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Conversation key; one participant per distinct sender id.
    pub sender_id: String,
    pub text: String,
    /// Unique per delivery attempt. Empty when the transport could not provide one.
    pub delivery_id: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(
        sender_id: impl Into<String>,
        text: impl Into<String>,
        delivery_id: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: text.into(),
            delivery_id: delivery_id.into(),
            received_at: Utc::now(),
        }
    }
}

/// Which routing step produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplySource {
    QuizContinuation,
    QuizStart,
    AutoReply,
    Fallback,
}

/// Reply text plus the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

impl Reply {
    pub fn new(text: impl Into<String>, source: ReplySource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Handler result for the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; nothing is sent.
    Stop,
    /// Stop the chain and send this reply.
    Reply(Reply),
}

/// Converts a transport-specific message type to an [`InboundMessage`].
pub trait ToInboundMessage: Send + Sync {
    fn to_inbound(&self) -> InboundMessage;
}

/// One routing step. The chain calls `handle` in order until one returns Stop or Reply.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, _message: &InboundMessage) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
}

/// Cross-cutting step around the handlers. `before` returning false stops the chain with no reply.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn before(&self, _message: &InboundMessage) -> crate::error::Result<bool> {
        Ok(true)
    }

    async fn after(
        &self,
        _message: &InboundMessage,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
