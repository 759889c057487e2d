//! Routing step 4 and its text source.
//!
//! [`StaticFallback`] returns the configured acknowledgment. [`HttpFallback`] asks an
//! OpenAI-compatible `/chat/completions` endpoint. Both run under the handler's timeout and
//! a failure is returned as an error, never replaced by a default text.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quizbot_core::{
    bounded, Handler, HandlerError, HandlerResponse, InboundMessage, QuizbotError, Reply,
    ReplySource, Result,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Text-in, text-out source of the fallback reply.
#[async_trait]
pub trait FallbackResponder: Send + Sync {
    async fn respond(&self, message: &InboundMessage) -> Result<String>;
}

pub struct StaticFallback {
    text: String,
}

impl StaticFallback {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl FallbackResponder for StaticFallback {
    async fn respond(&self, _message: &InboundMessage) -> Result<String> {
        Ok(self.text.clone())
    }
}

const SYSTEM_PROMPT: &str =
    "You are a friendly assistant for a quiz bot. Answer briefly. Tell users they can type \"start\" to play the quiz.";

pub struct HttpFallback {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpFallback {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    pub fn new(base_url: &str, api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| QuizbotError::Config(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn fallback_error(reason: impl Into<String>) -> QuizbotError {
    QuizbotError::Handler(HandlerError::Fallback(reason.into()))
}

#[async_trait]
impl FallbackResponder for HttpFallback {
    #[instrument(skip(self, message), fields(sender_id = %message.sender_id))]
    async fn respond(&self, message: &InboundMessage) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &message.text,
                },
            ],
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| fallback_error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(fallback_error(format!("status {}: {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| fallback_error(format!("malformed response: {}", e)))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| fallback_error("empty completion"))?;

        info!(model = %self.model, reply_len = text.len(), "step: fallback completion received");
        Ok(text)
    }
}

/// Routing step 4: always replies.
pub struct FallbackHandler {
    responder: Arc<dyn FallbackResponder>,
    timeout: Duration,
}

impl FallbackHandler {
    pub fn new(responder: Arc<dyn FallbackResponder>, timeout: Duration) -> Self {
        Self { responder, timeout }
    }
}

#[async_trait]
impl Handler for FallbackHandler {
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        let text = bounded("fallback_respond", self.timeout, self.responder.respond(message)).await?;
        Ok(HandlerResponse::Reply(Reply::new(text, ReplySource::Fallback)))
    }
}
