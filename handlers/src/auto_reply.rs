use std::sync::Arc;

use async_trait::async_trait;
use auto_reply::AutoReplyMatcher;
use quizbot_core::{Handler, HandlerResponse, InboundMessage, Reply, ReplySource, Result};

/// Routing step 3: reply with the first matching rule's response, else fall through.
pub struct AutoReplyHandler {
    matcher: Arc<AutoReplyMatcher>,
}

impl AutoReplyHandler {
    pub fn new(matcher: Arc<AutoReplyMatcher>) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl Handler for AutoReplyHandler {
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        Ok(match self.matcher.match_text(&message.text).await {
            Some(rule) => HandlerResponse::Reply(Reply::new(rule.response, ReplySource::AutoReply)),
            None => HandlerResponse::Continue,
        })
    }
}
