//! HTTP client for the wholesaler's XML feed documents.

use std::time::Duration;

use reqwest::Client;

use crate::error::FeedError;
use crate::retry::retry_with_backoff;

/// How much of an error response body is kept for diagnostics.
const BODY_SNIPPET_LEN: usize = 256;

/// HTTP client for fetching full feed documents.
///
/// Handles rate limiting (429) and other non-2xx responses as typed errors.
/// Transient errors (429, network failures, 5xx) are automatically retried
/// with exponential backoff up to `max_retries` additional attempts.
pub struct FeedClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl FeedClient {
    /// Creates a `FeedClient` with configured timeout, `User-Agent`, and
    /// retry policy. Set `max_retries` to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one full feed document as UTF-8 text, with automatic retry
    /// on transient errors.
    ///
    /// # Errors
    ///
    /// - [`FeedError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`FeedError::UnexpectedStatus`] — any other non-2xx status
    ///   (5xx retried, 4xx not).
    /// - [`FeedError::Http`] — network failure after all retries exhausted.
    pub async fn fetch_document(&self, url: &str) -> Result<String, FeedError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.to_owned();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(FeedError::RateLimited {
                        url,
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
                    return Err(FeedError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                        body: snippet,
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}
