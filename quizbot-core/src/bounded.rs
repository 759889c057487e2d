//! Bounded external I/O: every storage or responder call runs under a caller-supplied timeout.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{QuizbotError, Result};

/// Runs `fut` with `limit`; an elapsed timer becomes [`QuizbotError::Timeout`], never a silent success.
pub async fn bounded<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation = operation, timeout_ms = limit.as_millis() as u64, "step: operation timed out");
            Err(QuizbotError::Timeout {
                operation,
                after: limit,
            })
        }
    }
}
