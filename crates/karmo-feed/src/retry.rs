//! Retry with exponential back-off for transient upstream errors.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient conditions (429, network failures, 5xx). Parse errors and 4xx
//! statuses are returned immediately — retrying cannot fix them.

use std::future::Future;
use std::time::Duration;

use crate::error::FeedError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable:
/// - [`FeedError::RateLimited`] — HTTP 429; the server has asked us to back off.
/// - [`FeedError::Http`] — timeout or connection-level failure.
/// - [`FeedError::UnexpectedStatus`] with a 5xx status.
///
/// Not retriable:
/// - [`FeedError::UnexpectedStatus`] with a 4xx status — same result every time.
/// - [`FeedError::Xml`] — the document itself is broken.
fn is_retriable(err: &FeedError) -> bool {
    match err {
        FeedError::RateLimited { .. } => true,
        FeedError::Http(e) => e.is_timeout() || e.is_connect(),
        FeedError::UnexpectedStatus { status, .. } => *status >= 500,
        FeedError::Xml { .. } | FeedError::NotXml { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The wait before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds,
/// capped at 60s, with ±25% jitter. With `max_retries = 3` the operation is
/// attempted at most 4 times; the last error is returned when retries are
/// exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, FeedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    const MAX_DELAY_SECS: u64 = 60;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_secs.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_SECS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms =
                    (capped as f64 * 1000.0 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient feed error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
