//! Quiz and auto-reply handlers over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use auto_reply::AutoReplyMatcher;
use quiz_engine::{EngineSettings, QuizEngine};
use quizbot_core::{Handler, HandlerResponse, InboundMessage, QuizbotError, ReplySource};
use storage::{InMemoryStore, QuestionRecord, QuizStore, RuleRecord};

use crate::{AutoReplyHandler, QuizContinuationHandler, QuizStartHandler, StartTriggers};

fn setup() -> (Arc<InMemoryStore>, Arc<QuizEngine>) {
    let store = Arc::new(InMemoryStore::seeded(
        vec![
            QuestionRecord::new("q1", 0, "Q1", vec!["1".into(), "2".into()], 5),
            QuestionRecord::new("q2", 1, "Q2", vec!["1".into()], 10),
        ],
        vec![RuleRecord::new("greet", vec!["hello".into(), "hi".into()], "Welcome!", 0)],
    ));
    let engine = Arc::new(QuizEngine::new(
        store.clone(),
        store.clone(),
        EngineSettings::default(),
    ));
    (store, engine)
}

fn msg(text: &str) -> InboundMessage {
    InboundMessage::new("+15550001", text, format!("d-{}", text))
}

fn reply_of(response: HandlerResponse) -> (String, ReplySource) {
    match response {
        HandlerResponse::Reply(r) => (r.text, r.source),
        other => panic!("expected reply, got {:?}", other),
    }
}

#[tokio::test]
async fn test_continuation_without_session_continues() {
    let (_, engine) = setup();
    let handler = QuizContinuationHandler::new(engine);
    assert_eq!(handler.handle(&msg("1")).await.unwrap(), HandlerResponse::Continue);
}

#[tokio::test]
async fn test_start_handler_ignores_non_trigger() {
    let (store, engine) = setup();
    let handler = QuizStartHandler::new(engine, StartTriggers::builtin());
    assert_eq!(handler.handle(&msg("hello")).await.unwrap(), HandlerResponse::Continue);
    assert!(store.list_sessions("+15550001").await.unwrap().is_empty());
}

/// **Test: start then continuation walks the quiz to completion.**
///
/// **Setup:** Q1 (5 points), Q2 (10 points).
/// **Action:** "start" via start handler, then "1", "1" via continuation handler.
/// **Expected:** Q1, Q2, completion with 15.
#[tokio::test]
async fn test_start_and_continue_to_completion() {
    let (_, engine) = setup();
    let start = QuizStartHandler::new(engine.clone(), StartTriggers::builtin());
    let cont = QuizContinuationHandler::new(engine);

    let (text, source) = reply_of(start.handle(&msg("start")).await.unwrap());
    assert_eq!(source, ReplySource::QuizStart);
    assert!(text.contains("Q1"));

    let (text, source) = reply_of(cont.handle(&msg("1")).await.unwrap());
    assert_eq!(source, ReplySource::QuizContinuation);
    assert!(text.contains("Q2"));

    let (text, _) = reply_of(cont.handle(&msg("1")).await.unwrap());
    assert_eq!(text, "Quiz complete! Your score: 15");
}

#[tokio::test]
async fn test_start_handler_surfaces_storage_failure() {
    let (store, engine) = setup();
    store.set_available(false);
    let handler = QuizStartHandler::new(engine, StartTriggers::builtin());
    let err = handler.handle(&msg("start")).await.unwrap_err();
    assert!(matches!(err, QuizbotError::StorageUnavailable(_)));
}

#[tokio::test]
async fn test_auto_reply_handler() {
    let (store, _) = setup();
    let matcher = Arc::new(AutoReplyMatcher::new(store, Duration::from_secs(1)));
    let handler = AutoReplyHandler::new(matcher);

    let (text, source) = reply_of(handler.handle(&msg("hi there")).await.unwrap());
    assert_eq!(text, "Welcome!");
    assert_eq!(source, ReplySource::AutoReply);
    assert_eq!(handler.handle(&msg("what?")).await.unwrap(), HandlerResponse::Continue);
}
