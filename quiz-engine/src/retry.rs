//! Single retry on concurrent modification.

use std::future::Future;

use quizbot_core::{QuizbotError, Result};
use tracing::warn;

/// Runs `op`; if it fails with [`QuizbotError::ConcurrentModification`] runs it once more
/// (the closure must re-read state). A second conflict is returned to the caller.
pub async fn retry_on_conflict<F, Fut, T>(operation: &'static str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Err(QuizbotError::ConcurrentModification(reason)) => {
            warn!(operation = operation, reason = %reason, "step: concurrent modification, retrying once");
            op().await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_retries_once_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result = retry_on_conflict("op", || async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(QuizbotError::ConcurrentModification("first".into()))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_conflict_surfaces() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<()> = retry_on_conflict("op", || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(QuizbotError::ConcurrentModification("again".into()))
        })
        .await;
        assert!(matches!(result, Err(QuizbotError::ConcurrentModification(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<()> = retry_on_conflict("op", || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(QuizbotError::NoActiveQuestionBank)
        })
        .await;
        assert!(matches!(result, Err(QuizbotError::NoActiveQuestionBank)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
