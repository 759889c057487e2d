//! Per-sender FIFO lanes.
//!
//! Each sender gets an unbounded queue drained by a single task, so messages from one sender are
//! routed and answered in arrival order while different senders proceed in parallel. A lane is
//! removed once its worker finds nothing pending; the next message starts a fresh one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use quizbot_core::{Bot, InboundMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::router::Router;
use crate::runner::{process_message, ReplyTexts};

struct Lane {
    tx: mpsc::UnboundedSender<InboundMessage>,
    /// Enqueued and not yet fully processed.
    pending: Arc<AtomicUsize>,
}

struct Shared {
    router: Arc<Router>,
    bot: Arc<dyn Bot>,
    texts: ReplyTexts,
    lanes: DashMap<String, Lane>,
}

#[derive(Clone)]
pub struct SenderQueues {
    shared: Arc<Shared>,
}

impl SenderQueues {
    pub fn new(router: Arc<Router>, bot: Arc<dyn Bot>, texts: ReplyTexts) -> Self {
        Self {
            shared: Arc::new(Shared {
                router,
                bot,
                texts,
                lanes: DashMap::new(),
            }),
        }
    }

    /// Queues `message` behind earlier messages from the same sender. Must run inside a tokio runtime.
    pub fn enqueue(&self, message: InboundMessage) {
        let sender_id = message.sender_id.clone();
        let lane = self
            .shared
            .lanes
            .entry(sender_id.clone())
            .or_insert_with(|| self.spawn_lane(sender_id.clone()));
        // The entry guard is held across the send, so the worker cannot retire the lane in between.
        lane.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = lane.tx.send(message) {
            lane.pending.fetch_sub(1, Ordering::SeqCst);
            error!(sender_id = %sender_id, delivery_id = %e.0.delivery_id, "Sender lane closed, message dropped");
        }
    }

    /// Senders with a live lane.
    pub fn active_senders(&self) -> usize {
        self.shared.lanes.len()
    }

    fn spawn_lane(&self, sender_id: String) -> Lane {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        debug!(sender_id = %sender_id, "step: sender lane opened");
        tokio::spawn(drain_lane(self.shared.clone(), sender_id, rx, pending.clone()));
        Lane { tx, pending }
    }
}

async fn drain_lane(
    shared: Arc<Shared>,
    sender_id: String,
    mut rx: mpsc::UnboundedReceiver<InboundMessage>,
    pending: Arc<AtomicUsize>,
) {
    while let Some(message) = rx.recv().await {
        info!(
            sender_id = %message.sender_id,
            delivery_id = %message.delivery_id,
            "step: processing message"
        );
        if let Err(e) = process_message(&shared.router, shared.bot.as_ref(), &shared.texts, &message).await {
            error!(error = %e, sender_id = %message.sender_id, "Failed to deliver reply");
        }
        pending.fetch_sub(1, Ordering::SeqCst);

        // Checked under the shard lock that enqueue holds while sending.
        let retired = shared
            .lanes
            .remove_if(&sender_id, |_, lane| lane.pending.load(Ordering::SeqCst) == 0)
            .is_some();
        if retired {
            debug!(sender_id = %sender_id, "step: sender lane closed");
            break;
        }
    }
}
