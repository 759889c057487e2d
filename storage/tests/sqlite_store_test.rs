//! Integration tests for [`storage::SqliteStore`].
//!
//! Covers question ordering with gaps and duplicate keys, rule ordering, the one-active-session
//! index, compare-and-set session transitions, and the answer uniqueness constraint, using an
//! in-memory SQLite database.

use chrono::Utc;
use storage::{
    AnswerRecord, Lookup, ParticipantStatus, QuestionBank, QuestionRecord, QuizStore, RuleRecord,
    RuleSet, SessionRecord, SessionStatus, SqliteStore, StorageError,
};

async fn store() -> SqliteStore {
    SqliteStore::new("sqlite::memory:")
        .await
        .expect("Failed to create store")
}

fn question(id: &str, key: i64) -> QuestionRecord {
    QuestionRecord::new(id, key, format!("Prompt {}", id), vec!["1".into(), "2".into()], 5)
}

/// **Test: question_after picks the smallest key strictly greater, tolerating gaps and duplicates.**
///
/// **Setup:** Questions with keys {0, 2, 2, 3}; the two key-2 questions have ids "b" and "a".
/// **Action:** `question_after(None)`, `question_after(Some(0))`, `question_after(Some(2))`, `question_after(Some(3))`.
/// **Expected:** key 0; key 2 with id "a" (smallest id); key 3; NotFound.
#[tokio::test]
async fn test_question_after_handles_gaps_and_duplicates() {
    let store = store().await;
    store
        .replace_questions(&[question("q0", 0), question("b", 2), question("a", 2), question("q3", 3)])
        .await
        .unwrap();

    let first = store.question_after(None).await.unwrap().found().unwrap();
    assert_eq!(first.sequence_key, 0);

    let second = store.question_after(Some(0)).await.unwrap().found().unwrap();
    assert_eq!(second.sequence_key, 2);
    assert_eq!(second.id, "a");

    let third = store.question_after(Some(2)).await.unwrap().found().unwrap();
    assert_eq!(third.sequence_key, 3);

    assert_eq!(store.question_after(Some(3)).await.unwrap(), Lookup::NotFound);

    let at_two = store.question_at(2).await.unwrap().found().unwrap();
    assert_eq!(at_two.id, "a");
}

/// **Test: Question options and correct token survive a round trip through the JSON column.**
#[tokio::test]
async fn test_list_questions_preserves_content() {
    let store = store().await;
    let q = QuestionRecord::new("q1", 10, "Capital of France?", vec!["1".into(), "2".into(), "3".into()], 7)
        .with_correct_token("2");
    store.replace_questions(&[q.clone()]).await.unwrap();

    let listed = store.list_questions().await.unwrap();
    assert_eq!(listed, vec![q]);
}

/// **Test: Active rules come back by descending priority, ties by position; inactive rules are hidden.**
#[tokio::test]
async fn test_list_active_rules_ordering() {
    let store = store().await;
    let mut low = RuleRecord::new("low", vec!["hi".into()], "low", 1);
    low.position = 0;
    let mut high_late = RuleRecord::new("high-late", vec!["hi".into()], "high late", 5);
    high_late.position = 2;
    let mut high_early = RuleRecord::new("high-early", vec!["hi".into()], "high early", 5);
    high_early.position = 1;
    let mut inactive = RuleRecord::new("off", vec!["hi".into()], "off", 100);
    inactive.active = false;

    store
        .replace_rules(&[low, high_late, high_early, inactive])
        .await
        .unwrap();

    let ids: Vec<String> = store
        .list_active_rules()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["high-early", "high-late", "low"]);
}

/// **Test: ensure_participant is idempotent and starts participants as `new`.**
#[tokio::test]
async fn test_ensure_participant_idempotent() {
    let store = store().await;
    let first = store.ensure_participant("+100").await.unwrap();
    let second = store.ensure_participant("+100").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.status, ParticipantStatus::New);
    assert_eq!(first.score, 0);
    assert!(store.find_participant("+100").await.unwrap().is_found());
    assert_eq!(store.find_participant("+999").await.unwrap(), Lookup::NotFound);
}

/// **Test: A second active session for the same participant is rejected.**
///
/// **Setup:** Participant with one active session.
/// **Action:** `create_session` with another active session.
/// **Expected:** `AlreadyExists`; only one session stored; participant is `active`.
#[tokio::test]
async fn test_one_active_session_per_participant() {
    let store = store().await;
    store.ensure_participant("p1").await.unwrap();
    store.create_session(&SessionRecord::start("p1")).await.unwrap();

    let err = store.create_session(&SessionRecord::start("p1")).await.unwrap_err();
    assert!(matches!(err, StorageError::AlreadyExists(_)));

    assert_eq!(store.list_sessions("p1").await.unwrap().len(), 1);
    let p = store.find_participant("p1").await.unwrap().found().unwrap();
    assert_eq!(p.status, ParticipantStatus::Active);
}

/// **Test: advance_position is a compare-and-set on the current position.**
#[tokio::test]
async fn test_advance_position_compare_and_set() {
    let store = store().await;
    store.ensure_participant("p1").await.unwrap();
    let session = SessionRecord::start("p1");
    store.create_session(&session).await.unwrap();

    store.advance_position(&session.id, None, 2, 5).await.unwrap();

    let stale = store.advance_position(&session.id, None, 3, 10).await.unwrap_err();
    assert!(matches!(stale, StorageError::Conflict(_)));

    let active = store.active_session("p1").await.unwrap().found().unwrap();
    assert_eq!(active.current_position, Some(2));
    assert_eq!(active.score, 5);
}

/// **Test: complete_session finalizes the session and credits the participant atomically.**
#[tokio::test]
async fn test_complete_session_updates_participant() {
    let store = store().await;
    store.ensure_participant("p1").await.unwrap();
    let session = SessionRecord::start("p1");
    store.create_session(&session).await.unwrap();
    store.advance_position(&session.id, None, 1, 5).await.unwrap();

    let participant = store
        .complete_session(&session.id, Some(1), 15, Utc::now())
        .await
        .unwrap();
    assert_eq!(participant.score, 15);
    assert_eq!(participant.status, ParticipantStatus::Completed);

    assert_eq!(store.active_session("p1").await.unwrap(), Lookup::NotFound);
    let sessions = store.list_sessions("p1").await.unwrap();
    assert_eq!(sessions[0].status, SessionStatus::Completed);
    assert_eq!(sessions[0].score, 15);
    assert!(sessions[0].ended_at.is_some());

    let again = store
        .complete_session(&session.id, Some(1), 15, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(again, StorageError::Conflict(_)));
    let p = store.find_participant("p1").await.unwrap().found().unwrap();
    assert_eq!(p.score, 15);
}

/// **Test: end_active_session ends only the active session and allows a fresh one afterwards.**
#[tokio::test]
async fn test_end_active_session_then_restart() {
    let store = store().await;
    store.ensure_participant("p1").await.unwrap();
    assert_eq!(store.end_active_session("p1", Utc::now()).await.unwrap(), Lookup::NotFound);

    let first = SessionRecord::start("p1");
    store.create_session(&first).await.unwrap();
    let ended = store.end_active_session("p1", Utc::now()).await.unwrap().found().unwrap();
    assert_eq!(ended.id, first.id);
    assert_eq!(ended.status, SessionStatus::Ended);

    let second = SessionRecord::start("p1");
    store.create_session(&second).await.unwrap();

    let sessions = store.list_sessions("p1").await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions.iter().filter(|s| s.is_active()).count(), 1);
}

/// **Test: A second answer to the same question in a session is rejected.**
#[tokio::test]
async fn test_answer_unique_per_question() {
    let store = store().await;
    store.ensure_participant("p1").await.unwrap();
    let session = SessionRecord::start("p1");
    store.create_session(&session).await.unwrap();

    store
        .insert_answer(&AnswerRecord::new(&session.id, "q1", "1", 5))
        .await
        .unwrap();
    let dup = store
        .insert_answer(&AnswerRecord::new(&session.id, "q1", "2", 0))
        .await
        .unwrap_err();
    assert!(matches!(dup, StorageError::AlreadyExists(_)));

    let stored = store.find_answer(&session.id, "q1").await.unwrap().found().unwrap();
    assert_eq!(stored.raw_input, "1");
    assert_eq!(store.list_answers(&session.id).await.unwrap().len(), 1);
}

/// **Test: A file-backed database keeps data across store instances.**
#[tokio::test]
async fn test_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiz.db");
    let url = path.to_string_lossy().to_string();

    {
        let store = SqliteStore::new(&url).await.unwrap();
        store.ensure_participant("p1").await.unwrap();
    }

    let reopened = SqliteStore::new(&url).await.unwrap();
    assert!(reopened.find_participant("p1").await.unwrap().is_found());
}
