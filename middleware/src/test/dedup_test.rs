//! Unit tests for Deduplicator and DedupMiddleware.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quizbot_core::{InboundMessage, Middleware};

use crate::{Admission, DedupMiddleware, Deduplicator};

#[test]
fn test_first_delivery_accepted_repeat_is_duplicate() {
    let dedup = Deduplicator::new(Duration::from_secs(30));
    let now = Utc::now();
    assert_eq!(dedup.admit_at("wamid.1", now), Admission::Accepted);
    assert_eq!(
        dedup.admit_at("wamid.1", now + chrono::Duration::seconds(5)),
        Admission::Duplicate
    );
    assert_eq!(dedup.admit_at("wamid.2", now), Admission::Accepted);
}

#[test]
fn test_delivery_accepted_again_after_window() {
    let dedup = Deduplicator::new(Duration::from_secs(30));
    let now = Utc::now();
    assert_eq!(dedup.admit_at("wamid.1", now), Admission::Accepted);
    assert_eq!(
        dedup.admit_at("wamid.1", now + chrono::Duration::seconds(31)),
        Admission::Accepted
    );
}

#[test]
fn test_empty_delivery_id_fails_open() {
    let dedup = Deduplicator::new(Duration::from_secs(30));
    assert_eq!(dedup.admit(""), Admission::Accepted);
    assert_eq!(dedup.admit("   "), Admission::Accepted);
    assert_eq!(dedup.tracked(), 0);
}

#[test]
fn test_prune_drops_expired_entries() {
    let dedup = Deduplicator::new(Duration::from_secs(10));
    let now = Utc::now();
    dedup.admit_at("old", now);
    dedup.admit_at("fresh", now + chrono::Duration::seconds(8));
    dedup.prune(now + chrono::Duration::seconds(12));
    assert_eq!(dedup.tracked(), 1);
    assert_eq!(
        dedup.admit_at("fresh", now + chrono::Duration::seconds(12)),
        Admission::Duplicate
    );
}

/// **Test: Concurrent identical deliveries produce exactly one Accepted.**
///
/// **Setup:** One shared deduplicator, 32 tasks admitting the same id at once.
/// **Expected:** Exactly one task sees Accepted.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_deliveries_single_accept() {
    let dedup = Arc::new(Deduplicator::new(Duration::from_secs(60)));
    let mut tasks = Vec::new();
    for _ in 0..32 {
        let dedup = dedup.clone();
        tasks.push(tokio::spawn(async move { dedup.admit("same-delivery") }));
    }
    let mut accepted = 0;
    for task in tasks {
        if task.await.unwrap() == Admission::Accepted {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}

#[tokio::test]
async fn test_dedup_middleware_stops_duplicate() {
    let mw = DedupMiddleware::new(Deduplicator::new(Duration::from_secs(60)));
    let msg = InboundMessage::new("+15550001", "start", "delivery-7");
    assert!(mw.before(&msg).await.unwrap());
    assert!(!mw.before(&msg).await.unwrap());
}
