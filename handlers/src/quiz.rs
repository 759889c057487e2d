use std::sync::Arc;

use async_trait::async_trait;
use quiz_engine::QuizEngine;
use quizbot_core::{Handler, HandlerResponse, InboundMessage, Reply, ReplySource, Result};
use storage::Lookup;
use tracing::{info, instrument};

use crate::triggers::StartTriggers;

/// Routing step 1: a participant with an active session gets every message treated as an answer.
pub struct QuizContinuationHandler {
    engine: Arc<QuizEngine>,
}

impl QuizContinuationHandler {
    pub fn new(engine: Arc<QuizEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Handler for QuizContinuationHandler {
    #[instrument(skip(self, message), fields(sender_id = %message.sender_id))]
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        match self.engine.answer(&message.sender_id, &message.text).await? {
            Lookup::Found(reply) => Ok(HandlerResponse::Reply(Reply::new(
                reply.text,
                ReplySource::QuizContinuation,
            ))),
            Lookup::NotFound => Ok(HandlerResponse::Continue),
        }
    }
}

/// Routing step 2: start a quiz when the text contains a start trigger.
pub struct QuizStartHandler {
    engine: Arc<QuizEngine>,
    triggers: StartTriggers,
}

impl QuizStartHandler {
    pub fn new(engine: Arc<QuizEngine>, triggers: StartTriggers) -> Self {
        Self { engine, triggers }
    }
}

#[async_trait]
impl Handler for QuizStartHandler {
    #[instrument(skip(self, message), fields(sender_id = %message.sender_id))]
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        if !self.triggers.matches(&message.text) {
            return Ok(HandlerResponse::Continue);
        }
        info!(sender_id = %message.sender_id, "step: start trigger matched");
        let reply = self.engine.start(&message.sender_id).await?;
        Ok(HandlerResponse::Reply(Reply::new(
            reply.text,
            ReplySource::QuizStart,
        )))
    }
}
