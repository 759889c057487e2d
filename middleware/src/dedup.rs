//! Delivery deduplication.
//!
//! [`Deduplicator`] remembers the first-seen time of each delivery id for a fixed window.
//! Admission is an atomic check-and-insert on the id's map entry, so concurrent identical
//! deliveries see exactly one `Accepted`. Expired entries are dropped lazily.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use quizbot_core::{InboundMessage, Middleware, Result};
use tracing::{info, instrument, warn};

const PRUNE_EVERY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Duplicate,
}

#[derive(Debug)]
pub struct Deduplicator {
    seen: DashMap<String, DateTime<Utc>>,
    window: Duration,
    admissions: AtomicUsize,
}

impl Deduplicator {
    pub fn new(window: std::time::Duration) -> Self {
        Self {
            seen: DashMap::new(),
            window: Duration::from_std(window).unwrap_or_else(|_| Duration::days(365)),
            admissions: AtomicUsize::new(0),
        }
    }

    pub fn admit(&self, delivery_id: &str) -> Admission {
        self.admit_at(delivery_id, Utc::now())
    }

    /// Admission at an explicit instant. An empty id is always accepted and flagged.
    pub fn admit_at(&self, delivery_id: &str, now: DateTime<Utc>) -> Admission {
        let delivery_id = delivery_id.trim();
        if delivery_id.is_empty() {
            warn!(dedup_bypassed = true, "Delivery without id admitted without deduplication");
            return Admission::Accepted;
        }

        if self.admissions.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune(now);
        }

        match self.seen.entry(delivery_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if now - *entry.get() < self.window {
                    Admission::Duplicate
                } else {
                    entry.insert(now);
                    Admission::Accepted
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                Admission::Accepted
            }
        }
    }

    /// Drops entries first seen a full window or more before `now`.
    pub fn prune(&self, now: DateTime<Utc>) {
        let window = self.window;
        self.seen.retain(|_, first_seen| now - *first_seen < window);
    }

    pub fn tracked(&self) -> usize {
        self.seen.len()
    }
}

/// Stops the chain (no reply, no side effects) for a delivery already admitted inside the window.
pub struct DedupMiddleware {
    dedup: Deduplicator,
}

impl DedupMiddleware {
    pub fn new(dedup: Deduplicator) -> Self {
        Self { dedup }
    }
}

#[async_trait]
impl Middleware for DedupMiddleware {
    #[instrument(skip(self, message), fields(delivery_id = %message.delivery_id))]
    async fn before(&self, message: &InboundMessage) -> Result<bool> {
        match self.dedup.admit(&message.delivery_id) {
            Admission::Accepted => Ok(true),
            Admission::Duplicate => {
                info!(
                    sender_id = %message.sender_id,
                    "step: duplicate delivery dropped"
                );
                Ok(false)
            }
        }
    }
}
