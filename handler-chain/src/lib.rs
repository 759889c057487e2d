//! # Handler chain
//!
//! Runs a sequence of middleware (before/after) and handlers for each inbound message. Middleware can stop
//! the chain; the first handler that returns Stop or Reply ends handler execution; after callbacks run in reverse order.
//! An error from any step aborts the chain and is returned as-is; later handlers never see the message.

use quizbot_core::{Handler, HandlerResponse, InboundMessage, Middleware, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chain of middleware and handlers: middleware run in order (before), then handlers; middleware after run in reverse order.
#[derive(Clone, Default)]
pub struct HandlerChain {
    middleware: Vec<Arc<dyn Middleware>>,
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain (no middleware, no handlers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware (runs before handlers, after in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a handler (runs in order; first Stop/Reply ends handler phase).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Runs middleware before, then handlers; then middleware after in reverse. Returns first Stop or Reply, or Continue.
    #[instrument(skip(self, message), fields(sender_id = %message.sender_id, delivery_id = %message.delivery_id))]
    pub async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        let mut final_response = HandlerResponse::Continue;

        debug!("step: handler_chain started");

        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            let should_continue = mw.before(message).await?;
            if !should_continue {
                info!(
                    middleware = %mw_name,
                    "step: middleware before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
            debug!(middleware = %mw_name, "step: middleware before done");
        }

        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            let response = handler.handle(message).await?;
            debug!(
                handler = %handler_name,
                response = ?response,
                "step: handler done"
            );

            match response {
                HandlerResponse::Stop | HandlerResponse::Reply(_) => {
                    info!(handler = %handler_name, "step: handler chain stopped by handler");
                    final_response = response;
                    break;
                }
                HandlerResponse::Continue => continue,
            }
        }

        for mw in self.middleware.iter().rev() {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            mw.after(message, &final_response).await?;
            debug!(middleware = %mw_name, "step: middleware after done");
        }

        debug!("step: handler_chain finished");

        Ok(final_response)
    }
}

// Unit/integration tests live in tests/handler_chain_test.rs
