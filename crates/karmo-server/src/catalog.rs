//! Backend dispatch for the catalog query pipeline.
//!
//! The storefront reads from one of two interchangeable upstreams: the
//! wholesaler XML feed (optionally paired with a stock overlay document) or
//! the Apilo ERP REST API. Which one is live comes from configuration;
//! handlers only see [`CatalogService::fetch_catalog`].

use karmo_apilo::{ApiloClient, ApiloError};
use karmo_core::{AppConfig, FeedBackend, Product};
use karmo_feed::{fetch_merged_catalog, FeedClient, FeedError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Apilo(#[from] ApiloError),

    #[error("catalog backend misconfigured: {0}")]
    Config(String),
}

enum Backend {
    Xml {
        client: FeedClient,
        feed_url: String,
        stock_feed_url: Option<String>,
    },
    Apilo(ApiloClient),
}

pub struct CatalogService {
    backend: Backend,
}

impl CatalogService {
    /// Builds the service for whichever backend the configuration selects.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Config`] when the selected backend's settings
    /// are incomplete, or the wrapped client-construction error.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        match config.feed_backend {
            FeedBackend::Xml => {
                let feed_url = config.feed_url.clone().ok_or_else(|| {
                    CatalogError::Config("KARMO_FEED_URL is required for the xml backend".into())
                })?;
                let client = FeedClient::new(
                    config.feed_timeout_secs,
                    &config.feed_user_agent,
                    config.feed_max_retries,
                    config.feed_backoff_base_secs,
                )
                .map_err(CatalogError::Feed)?;
                Ok(Self {
                    backend: Backend::Xml {
                        client,
                        feed_url,
                        stock_feed_url: config.stock_feed_url.clone(),
                    },
                })
            }
            FeedBackend::Apilo => {
                let apilo = config.apilo.as_ref().ok_or_else(|| {
                    CatalogError::Config(
                        "KARMO_APILO_* settings are required for the apilo backend".into(),
                    )
                })?;
                let client = ApiloClient::from_config(apilo, config.feed_timeout_secs)
                    .map_err(CatalogError::Apilo)?;
                Ok(Self {
                    backend: Backend::Apilo(client),
                })
            }
        }
    }

    /// Fetches one complete catalog snapshot from the live backend. Every
    /// call goes to the upstream from scratch; nothing is cached.
    ///
    /// # Errors
    ///
    /// The wrapped fetch/parse error from whichever backend is live.
    pub async fn fetch_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        match &self.backend {
            Backend::Xml {
                client,
                feed_url,
                stock_feed_url,
            } => Ok(fetch_merged_catalog(client, feed_url, stock_feed_url.as_deref()).await?),
            Backend::Apilo(client) => Ok(client.fetch_all_products().await?),
        }
    }

    /// Runs the one-time Apilo authorization-code exchange and installs the
    /// resulting token on the client.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Config`] when the xml backend is live, or the
    /// wrapped [`ApiloError`] from the exchange itself.
    pub async fn authorize_apilo(&self, auth_code: &str) -> Result<(), CatalogError> {
        match &self.backend {
            Backend::Apilo(client) => {
                client.exchange_auth_code(auth_code).await?;
                Ok(())
            }
            Backend::Xml { .. } => Err(CatalogError::Config(
                "the apilo backend is not configured".into(),
            )),
        }
    }
}
