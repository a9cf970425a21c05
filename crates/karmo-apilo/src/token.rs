//! Explicit token-holder state for the Apilo client.
//!
//! Tokens are plain values passed into and returned from the client — never
//! cached in process-wide mutable state. Expiry is compared at call time
//! with a small skew margin so a token is refreshed shortly before the
//! server would reject it.

use chrono::{DateTime, Duration, Utc};

/// Seconds before nominal expiry at which a token already counts as expired.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Fallback lifetime when the token endpoint does not report an expiry.
const DEFAULT_TTL_SECS: i64 = 3600;

/// One access/refresh token pair with its absolute expiry.
#[derive(Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: expires_at
                .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_TTL_SECS)),
        }
    }

    /// Whether the access token should be considered unusable at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
