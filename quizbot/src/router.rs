//! Router: the fixed routing chain behind a per-participant lock.
//!
//! Order is continuation, start trigger, auto-reply, fallback, and is not configurable:
//! while a quiz is active it owns the conversation. Deduplication runs first, inside the
//! participant's lock, so an admitted delivery is recorded before any session write.

use std::sync::Arc;

use auto_reply::AutoReplyMatcher;
use handler_chain::HandlerChain;
use handlers::{
    AutoReplyHandler, FallbackHandler, QuizContinuationHandler, QuizStartHandler, StartTriggers,
};
use middleware::{DedupMiddleware, Deduplicator, LoggingMiddleware};
use quiz_engine::QuizEngine;
use quizbot_core::{HandlerError, HandlerResponse, InboundMessage, QuizbotError, Reply, Result};
use tracing::{info, instrument};

use crate::locks::ParticipantLocks;

/// Outcome of routing one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Reply(Reply),
    /// Already admitted inside the dedup window; nothing was done and nothing should be sent.
    Duplicate,
}

pub struct Router {
    chain: HandlerChain,
    locks: ParticipantLocks,
}

impl Router {
    pub fn new(
        engine: Arc<QuizEngine>,
        matcher: Arc<AutoReplyMatcher>,
        triggers: StartTriggers,
        fallback: FallbackHandler,
        dedup: Deduplicator,
    ) -> Self {
        let chain = HandlerChain::new()
            .add_middleware(Arc::new(LoggingMiddleware))
            .add_middleware(Arc::new(DedupMiddleware::new(dedup)))
            .add_handler(Arc::new(QuizContinuationHandler::new(engine.clone())))
            .add_handler(Arc::new(QuizStartHandler::new(engine, triggers)))
            .add_handler(Arc::new(AutoReplyHandler::new(matcher)))
            .add_handler(Arc::new(fallback));
        Self {
            chain,
            locks: ParticipantLocks::new(),
        }
    }

    /// Routes one inbound delivery. Any dependency failure is returned as `Err`.
    #[instrument(skip(self, message), fields(sender_id = %message.sender_id, delivery_id = %message.delivery_id))]
    pub async fn route(&self, message: &InboundMessage) -> Result<Routed> {
        let _guard = self.locks.acquire(&message.sender_id).await;
        match self.chain.handle(message).await? {
            HandlerResponse::Reply(reply) => {
                info!(source = ?reply.source, "step: routed");
                Ok(Routed::Reply(reply))
            }
            HandlerResponse::Stop => Ok(Routed::Duplicate),
            HandlerResponse::Continue => Err(QuizbotError::Handler(HandlerError::State(
                "no routing step produced a reply".to_string(),
            ))),
        }
    }

    /// Participants currently holding or waiting on a routing lock.
    pub fn busy_participants(&self) -> usize {
        self.locks.len()
    }
}
