//! Per-sender lanes: messages from one sender are answered in arrival order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quizbot::{build_router, QuizConfig, ReplyTexts, SenderQueues};
use quizbot_core::{Bot, InboundMessage, Result};
use storage::{InMemoryStore, QuestionRecord, QuizStore, SessionStatus};
use tokio::sync::mpsc;

/// Forwards every outbound reply to a channel the test reads from.
struct ChannelBot {
    tx: mpsc::UnboundedSender<(String, String)>,
}

#[async_trait]
impl Bot for ChannelBot {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<()> {
        let _ = self.tx.send((recipient.to_string(), text.to_string()));
        Ok(())
    }
}

/// Only "1" scores on Q1 and only "2" scores on Q2, so swapped answers lose points.
fn ordered_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::seeded(
        vec![
            QuestionRecord::new("q1", 0, "Q1", vec!["1".into(), "2".into()], 5).with_correct_token("1"),
            QuestionRecord::new("q2", 1, "Q2", vec!["1".into(), "2".into()], 10).with_correct_token("2"),
        ],
        vec![],
    ))
}

fn setup(store: &Arc<InMemoryStore>) -> (SenderQueues, mpsc::UnboundedReceiver<(String, String)>) {
    let config = QuizConfig::default();
    let router = Arc::new(build_router(&config, store.clone()).unwrap());
    let (tx, rx) = mpsc::unbounded_channel();
    let queues = SenderQueues::new(router, Arc::new(ChannelBot { tx }), ReplyTexts::from_config(&config));
    (queues, rx)
}

async fn next_reply(rx: &mut mpsc::UnboundedReceiver<(String, String)>) -> (String, String) {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("reply within timeout")
        .expect("channel open")
}

/// **Test: Back-to-back messages from one sender are routed in order.**
///
/// **Setup:** Q1 scores only "1", Q2 scores only "2".
/// **Action:** "start", "1", "2" enqueued without waiting between them.
/// **Expected:** Replies arrive as Q1, Q2, completion; both answers score, total 15.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_sender_answered_in_arrival_order() {
    let store = ordered_store();
    let (queues, mut rx) = setup(&store);

    for (i, text) in ["start", "1", "2"].iter().enumerate() {
        queues.enqueue(InboundMessage::new("+15550001", *text, format!("d{}", i)));
    }

    let (_, first) = next_reply(&mut rx).await;
    let (_, second) = next_reply(&mut rx).await;
    let (_, third) = next_reply(&mut rx).await;
    assert!(first.contains("Q1"));
    assert!(second.contains("Q2"));
    assert_eq!(third, "Quiz complete! Your score: 15");

    let sessions = store.list_sessions("+15550001").await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, SessionStatus::Completed);
    let answers = store.list_answers(&sessions[0].id).await.unwrap();
    let points: Vec<i64> = answers.iter().map(|a| a.points).collect();
    assert_eq!(points, vec![5, 10]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_senders_keep_their_own_order() {
    let store = ordered_store();
    let (queues, mut rx) = setup(&store);

    for step in 0..3 {
        for sender in 0..4 {
            let text = ["start", "1", "2"][step];
            let sender_id = format!("user-{}", sender);
            queues.enqueue(InboundMessage::new(sender_id.as_str(), text, format!("{}-{}", sender_id, step)));
        }
    }

    for _ in 0..12 {
        next_reply(&mut rx).await;
    }
    for sender in 0..4 {
        let p = store
            .find_participant(&format!("user-{}", sender))
            .await
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(p.score, 15);
    }
}

#[tokio::test]
async fn test_idle_lane_is_retired() {
    let store = ordered_store();
    let (queues, mut rx) = setup(&store);

    queues.enqueue(InboundMessage::new("+15550001", "start", "d0"));
    next_reply(&mut rx).await;

    let mut retired = false;
    for _ in 0..100 {
        if queues.active_senders() == 0 {
            retired = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(retired);

    // A later message opens a new lane and is still served.
    queues.enqueue(InboundMessage::new("+15550001", "1", "d1"));
    let (_, text) = next_reply(&mut rx).await;
    assert!(text.contains("Q2"));
}
