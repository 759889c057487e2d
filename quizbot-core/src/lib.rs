//! # quizbot-core
//!
//! Core types and traits for the quiz bot: [`InboundMessage`], [`Reply`], [`Handler`], [`Middleware`],
//! the outbound [`Bot`] trait, the error taxonomy, text normalization, bounded I/O and tracing
//! initialization. Transport- and storage-agnostic.

pub mod bot;
pub mod bounded;
pub mod error;
pub mod logger;
pub mod normalize;
pub mod types;

pub use bot::Bot;
pub use bounded::bounded;
pub use error::{HandlerError, QuizbotError, Result};
pub use logger::init_tracing;
pub use normalize::{contains_phrase, normalize, words};
pub use types::{
    Handler, HandlerResponse, InboundMessage, Middleware, Reply, ReplySource, ToInboundMessage,
};
