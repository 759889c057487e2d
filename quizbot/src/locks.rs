//! Per-participant mutual exclusion.
//!
//! One async mutex per sender id, created on demand and removed again once nobody holds or
//! waits on it. Different senders never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct ParticipantLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held for one routing pass. Dropping it releases the lock and reclaims the entry if idle.
pub struct ParticipantGuard<'a> {
    locks: &'a ParticipantLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ParticipantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, participant_id: &str) -> ParticipantGuard<'_> {
        // Clone under the shard lock so reclamation cannot remove a mutex we are about to wait on.
        let mutex = self
            .locks
            .entry(participant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        ParticipantGuard {
            locks: self,
            key: participant_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of participants with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for ParticipantGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: no holder, no waiter.
        self.locks
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
