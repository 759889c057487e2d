//! Outbound send abstraction.
//!
//! [`Bot`] is transport-agnostic; the application crate implements it for Telegram and the console.

use crate::error::Result;
use async_trait::async_trait;

/// Delivers reply text to a sender. Implementations map to a transport.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends `text` to the conversation identified by `recipient` (the inbound sender id).
    async fn send_message(&self, recipient: &str, text: &str) -> Result<()>;
}
