//! Router integration tests over the in-memory store: routing order, deduplication,
//! serialization per participant and failure surfacing.

use std::sync::Arc;

use quiz_engine::InvalidAnswerPolicy;
use quizbot::{build_router, outbound_text, QuizConfig, ReplyTexts, Routed, Router};
use quizbot_core::{InboundMessage, QuizbotError, ReplySource};
use storage::{InMemoryStore, QuestionRecord, QuizStore, RuleRecord, SessionStatus};

const P: &str = "+15550001";

fn scenario_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::seeded(
        vec![
            QuestionRecord::new("q1", 0, "Q1", vec!["1".into(), "2".into()], 5),
            QuestionRecord::new("q2", 1, "Q2", vec!["1".into()], 10),
        ],
        vec![RuleRecord::new(
            "greet",
            vec!["hello".into(), "hi".into()],
            "Welcome!",
            0,
        )],
    ))
}

fn router_over(store: &Arc<InMemoryStore>) -> Router {
    build_router(&QuizConfig::default(), store.clone()).unwrap()
}

fn msg(text: &str, delivery: &str) -> InboundMessage {
    InboundMessage::new(P, text, delivery)
}

async fn reply(router: &Router, text: &str, delivery: &str) -> (String, ReplySource) {
    match router.route(&msg(text, delivery)).await.unwrap() {
        Routed::Reply(r) => (r.text, r.source),
        Routed::Duplicate => panic!("unexpected duplicate for {}", delivery),
    }
}

/// **Test: start, answer, answer completes with score 15.**
///
/// **Setup:** Q1 (key 0, tokens 1/2, 5 points), Q2 (key 1, token 1, 10 points).
/// **Action:** "start", "1", "1" as three deliveries.
/// **Expected:** Q1, then Q2, then completion with 15; session completed; two answers.
#[tokio::test]
async fn test_quiz_scenario_scores_fifteen() {
    let store = scenario_store();
    let router = router_over(&store);

    let (text, source) = reply(&router, "start", "d1").await;
    assert_eq!(source, ReplySource::QuizStart);
    assert!(text.contains("Q1"));

    let (text, source) = reply(&router, "1", "d2").await;
    assert_eq!(source, ReplySource::QuizContinuation);
    assert!(text.contains("Q2"));

    let (text, _) = reply(&router, "1", "d3").await;
    assert_eq!(text, "Quiz complete! Your score: 15");

    let sessions = store.list_sessions(P).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, SessionStatus::Completed);
    assert_eq!(sessions[0].score, 15);
    assert_eq!(store.list_answers(&sessions[0].id).await.unwrap().len(), 2);
}

/// **Test: A retried delivery is a no-op.**
///
/// **Action:** The same "start" delivery twice, then the same answer delivery twice.
/// **Expected:** One session, one answer; the repeats route to Duplicate.
#[tokio::test]
async fn test_retried_delivery_has_no_effect() {
    let store = scenario_store();
    let router = router_over(&store);

    assert!(matches!(router.route(&msg("start", "d1")).await.unwrap(), Routed::Reply(_)));
    assert_eq!(router.route(&msg("start", "d1")).await.unwrap(), Routed::Duplicate);
    assert_eq!(store.list_sessions(P).await.unwrap().len(), 1);

    assert!(matches!(router.route(&msg("1", "d2")).await.unwrap(), Routed::Reply(_)));
    assert_eq!(router.route(&msg("1", "d2")).await.unwrap(), Routed::Duplicate);
    let session = store.active_session(P).await.unwrap().found().unwrap();
    assert_eq!(store.list_answers(&session.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_greeting_gets_auto_reply_without_session() {
    let store = scenario_store();
    let router = router_over(&store);

    let (text, source) = reply(&router, "hi there", "d1").await;
    assert_eq!(text, "Welcome!");
    assert_eq!(source, ReplySource::AutoReply);
    assert!(store.list_sessions(P).await.unwrap().is_empty());
    assert!(!store.find_participant(P).await.unwrap().is_found());
}

/// **Test: A start trigger anywhere in the normalized text starts the quiz.**
///
/// **Action:** "startquiz", "quizz please" and "Quiz!" from three senders.
/// **Expected:** each reply comes from the start step and contains Q1.
#[tokio::test]
async fn test_start_trigger_contained_in_text() {
    let store = scenario_store();
    let router = router_over(&store);

    for (i, text) in ["startquiz", "quizz please", "Quiz!"].iter().enumerate() {
        let m = InboundMessage::new(format!("sender-{}", i), *text, format!("t{}", i));
        match router.route(&m).await.unwrap() {
            Routed::Reply(r) => {
                assert_eq!(r.source, ReplySource::QuizStart, "text {:?}", text);
                assert!(r.text.contains("Q1"));
            }
            Routed::Duplicate => panic!("unexpected duplicate"),
        }
    }
}

#[tokio::test]
async fn test_whole_word_triggers_are_opt_in() {
    let store = scenario_store();
    let config = QuizConfig {
        start_triggers_whole_words: true,
        ..QuizConfig::default()
    };
    let router = build_router(&config, store.clone()).unwrap();

    let (_, source) = reply(&router, "startquiz", "d1").await;
    assert_eq!(source, ReplySource::Fallback);
    let (_, source) = reply(&router, "let's start", "d2").await;
    assert_eq!(source, ReplySource::QuizStart);
}

#[tokio::test]
async fn test_unmatched_text_gets_fallback() {
    let store = scenario_store();
    let router = router_over(&store);

    let (text, source) = reply(&router, "what now?", "d1").await;
    assert_eq!(source, ReplySource::Fallback);
    assert_eq!(text, QuizConfig::default().fallback_text);
}

/// **Test: An active quiz owns the conversation.**
///
/// **Setup:** Session active at Q1; "hi" also matches the greeting rule.
/// **Expected:** "hi" is treated as an answer (recorded as zero, quiz advances), not auto-replied.
#[tokio::test]
async fn test_active_session_takes_priority_over_auto_reply() {
    let store = scenario_store();
    let router = router_over(&store);

    reply(&router, "start", "d1").await;
    let (text, source) = reply(&router, "hi", "d2").await;
    assert_eq!(source, ReplySource::QuizContinuation);
    assert!(text.contains("Q2"));

    let session = store.active_session(P).await.unwrap().found().unwrap();
    let answers = store.list_answers(&session.id).await.unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].points, 0);
}

#[tokio::test]
async fn test_reprompt_policy_keeps_question() {
    let store = scenario_store();
    let config = QuizConfig {
        invalid_answer_policy: InvalidAnswerPolicy::Reprompt,
        ..QuizConfig::default()
    };
    let router = build_router(&config, store.clone()).unwrap();

    reply(&router, "start", "d1").await;
    let (text, _) = reply(&router, "banana", "d2").await;
    assert!(text.contains("Q1"));
    let session = store.active_session(P).await.unwrap().found().unwrap();
    assert_eq!(session.current_position, None);
    assert!(store.list_answers(&session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_start_after_completion_creates_new_session() {
    let store = scenario_store();
    let router = router_over(&store);

    reply(&router, "start", "d1").await;
    reply(&router, "1", "d2").await;
    reply(&router, "1", "d3").await;
    let (text, source) = reply(&router, "quiz", "d4").await;
    assert_eq!(source, ReplySource::QuizStart);
    assert!(text.contains("Q1"));

    let sessions = store.list_sessions(P).await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].status, SessionStatus::Completed);
    assert_eq!(sessions[1].status, SessionStatus::Active);
    let participant = store.find_participant(P).await.unwrap().found().unwrap();
    assert_eq!(participant.score, 15);
}

/// **Test: Storage failure is an error, not a generic reply.**
///
/// **Setup:** Store unavailable.
/// **Expected:** route returns Err for both a start trigger and plain text; the runner maps it
/// to the failure text, which differs from the fallback and no-quiz texts.
#[tokio::test]
async fn test_storage_failure_surfaces_as_error() {
    let store = scenario_store();
    let router = router_over(&store);
    store.set_available(false);

    let err = router.route(&msg("start", "d1")).await.unwrap_err();
    assert!(matches!(err, QuizbotError::StorageUnavailable(_)));
    assert!(router.route(&msg("hello", "d2")).await.is_err());

    let config = QuizConfig::default();
    let texts = ReplyTexts::from_config(&config);
    let message = msg("hello", "d3");
    let text = outbound_text(router.route(&message).await, &texts, &message).unwrap();
    assert_eq!(text, config.failure_text);
    assert_ne!(text, config.fallback_text);
    assert_ne!(text, config.no_quiz_text);
}

#[tokio::test]
async fn test_empty_bank_is_no_quiz_not_completion() {
    let store = Arc::new(InMemoryStore::new());
    let router = router_over(&store);
    let config = QuizConfig::default();
    let texts = ReplyTexts::from_config(&config);

    let message = msg("start", "d1");
    let outcome = router.route(&message).await;
    assert!(matches!(outcome, Err(QuizbotError::NoActiveQuestionBank)));
    assert_eq!(outbound_text(outcome, &texts, &message).unwrap(), config.no_quiz_text);
    assert!(store.list_sessions(P).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_sends_nothing() {
    let store = scenario_store();
    let router = router_over(&store);
    let texts = ReplyTexts::from_config(&QuizConfig::default());
    let message = msg("hello", "d1");

    assert!(outbound_text(router.route(&message).await, &texts, &message).is_some());
    assert!(outbound_text(router.route(&message).await, &texts, &message).is_none());
}

/// **Test: Near-simultaneous messages from one sender are serialized.**
///
/// **Setup:** Active session at Q1; ten "1" messages with distinct delivery ids routed at once.
/// **Expected:** Exactly two answers (Q1, Q2), one completed session with score 15, no errors;
/// the remaining messages fall through to the fallback.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_messages_from_one_sender() {
    let store = scenario_store();
    let router = Arc::new(router_over(&store));
    reply(&router, "start", "d0").await;

    let mut tasks = Vec::new();
    for i in 0..10 {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            router.route(&msg("1", &format!("c{}", i))).await
        }));
    }
    let mut fallbacks = 0;
    for t in tasks {
        match t.await.unwrap().unwrap() {
            Routed::Reply(r) if r.source == ReplySource::Fallback => fallbacks += 1,
            Routed::Reply(_) => {}
            Routed::Duplicate => panic!("distinct deliveries must not be duplicates"),
        }
    }
    assert_eq!(fallbacks, 8);

    let sessions = store.list_sessions(P).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].status, SessionStatus::Completed);
    assert_eq!(sessions[0].score, 15);
    assert_eq!(store.list_answers(&sessions[0].id).await.unwrap().len(), 2);
    assert_eq!(router.busy_participants(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_senders_progress_independently() {
    let store = scenario_store();
    let router = Arc::new(router_over(&store));

    let mut tasks = Vec::new();
    for i in 0..5 {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            let sender = format!("user-{}", i);
            for (step, text) in ["start", "2", "1"].iter().enumerate() {
                let m = InboundMessage::new(sender.as_str(), *text, format!("{}-{}", sender, step));
                router.route(&m).await.unwrap();
            }
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }
    for i in 0..5 {
        let p = store
            .find_participant(&format!("user-{}", i))
            .await
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(p.score, 15);
    }
}
