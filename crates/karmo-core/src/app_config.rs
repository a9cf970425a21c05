use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which upstream the catalog is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedBackend {
    /// Wholesaler XML feed, optionally paired with a separate stock feed.
    Xml,
    /// Apilo ERP REST API with bearer-token auth.
    Apilo,
}

/// Credentials and tuning for the Apilo REST backend. Secrets come from the
/// environment only; they are never compiled in.
#[derive(Clone)]
pub struct ApiloConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub page_size: u32,
}

impl std::fmt::Debug for ApiloConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiloConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub feed_backend: FeedBackend,
    /// Wholesaler catalog document URL; present whenever the backend is
    /// [`FeedBackend::Xml`].
    pub feed_url: Option<String>,
    /// Secondary price/stock document URL; merged over the catalog by SKU
    /// when set.
    pub stock_feed_url: Option<String>,
    pub feed_timeout_secs: u64,
    pub feed_user_agent: String,
    pub feed_max_retries: u32,
    pub feed_backoff_base_secs: u64,
    /// Present whenever the backend is [`FeedBackend::Apilo`].
    pub apilo: Option<ApiloConfig>,
}
