use thiserror::Error;

/// Errors returned by the Apilo ERP client.
#[derive(Debug, Error)]
pub enum ApiloError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No token is held yet; the authorization-code exchange has to run
    /// before products can be fetched.
    #[error("no access token available; complete the authorization-code exchange first")]
    MissingToken,

    /// The token endpoint rejected a request, or a 401 from the product
    /// endpoint survived the single refresh-and-retry.
    #[error("Apilo auth error (status {status}): {body}")]
    Auth { status: u16, body: String },

    /// Any other non-2xx status from the product endpoint.
    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Guard against cycling pagination cursors.
    #[error("pagination limit reached: exceeded {max_pages} pages")]
    PaginationLimit { max_pages: usize },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
