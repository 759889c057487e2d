//! # Middleware crate for the quiz bot
//!
//! Middleware that runs around the routing handlers: delivery deduplication and logging.

mod dedup;
mod logging;

#[cfg(test)]
mod test;

pub use dedup::{Admission, DedupMiddleware, Deduplicator};
pub use logging::LoggingMiddleware;
