//! HTTP client for the Apilo ERP REST API.
//!
//! Wraps `reqwest` with Apilo-specific auth handling: an OAuth2-style
//! token exchange against `/rest/auth/token/` (Basic auth with the client
//! credentials) and bearer-token requests against the paginated warehouse
//! product endpoint. Tokens live in an explicit [`TokenSet`] behind a
//! `tokio::sync::Mutex`, so concurrent callers share one refresh instead of
//! racing.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::Mutex;

use karmo_core::{ApiloConfig, Product};

use crate::error::ApiloError;
use crate::normalize::normalize_product;
use crate::token::TokenSet;
use crate::types::{ApiloProductsResponse, TokenResponse};

/// Maximum number of pages to fetch before returning an error. Prevents
/// infinite loops when the upstream keeps reporting more data.
const MAX_PAGES: usize = 200;

/// How much of an error response body is kept for diagnostics.
const BODY_SNIPPET_LEN: usize = 256;

/// Client for the Apilo ERP REST API.
pub struct ApiloClient {
    client: Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    page_size: u32,
    token: Mutex<Option<TokenSet>>,
}

impl ApiloClient {
    /// Creates a new client against the given Apilo installation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiloError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ApiloError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
        timeout_secs: u64,
        page_size: u32,
    ) -> Result<Self, ApiloError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("karmo/0.1 (catalog-sync)")
            .build()?;

        // Normalise: exactly one trailing slash so Url::join appends path
        // segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiloError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            page_size,
            token: Mutex::new(None),
        })
    }

    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`ApiloClient::new`].
    pub fn from_config(config: &ApiloConfig, timeout_secs: u64) -> Result<Self, ApiloError> {
        Self::new(
            &config.base_url,
            &config.client_id,
            &config.client_secret,
            timeout_secs,
            config.page_size,
        )
    }

    /// Installs a token obtained elsewhere (e.g. persisted from a previous
    /// authorization-code exchange).
    pub async fn set_token(&self, token: TokenSet) {
        *self.token.lock().await = Some(token);
    }

    /// Exchanges a one-time authorization code for a token pair and
    /// installs it on the client. Returns the token set so the caller can
    /// persist it.
    ///
    /// # Errors
    ///
    /// [`ApiloError::Auth`] when the token endpoint rejects the exchange,
    /// [`ApiloError::Http`]/[`ApiloError::Deserialize`] on transport or
    /// envelope problems.
    pub async fn exchange_auth_code(&self, code: &str) -> Result<TokenSet, ApiloError> {
        let token = self
            .request_token(serde_json::json!({
                "grantType": "authorization_code",
                "code": code,
            }))
            .await?;
        *self.token.lock().await = Some(token.clone());
        Ok(token)
    }

    /// Fetches one page from the warehouse product endpoint.
    ///
    /// On a 401 the client refreshes the token and retries exactly once; if
    /// the refresh or the retry fails, the original 401 is surfaced.
    ///
    /// # Errors
    ///
    /// - [`ApiloError::MissingToken`] — no exchange has happened yet.
    /// - [`ApiloError::Auth`] — 401 that survived the single retry.
    /// - [`ApiloError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ApiloError::Http`] / [`ApiloError::Deserialize`] — transport or
    ///   body problems.
    pub async fn fetch_products_page(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<ApiloProductsResponse, ApiloError> {
        let access = self.current_access_token().await?;
        let response = self.products_request(&access, limit, offset).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            let original = ApiloError::Auth {
                status: 401,
                body: snippet(&body),
            };
            tracing::warn!("product endpoint returned 401, refreshing token and retrying once");

            let Ok(access) = self.force_refresh().await else {
                return Err(original);
            };
            let Ok(retry) = self.products_request(&access, limit, offset).await else {
                return Err(original);
            };
            return match Self::decode_products(retry).await {
                Ok(page) => Ok(page),
                Err(_) => Err(original),
            };
        }

        Self::decode_products(response).await
    }

    /// Fetches and normalizes the complete warehouse catalog, walking the
    /// limit/offset pagination until the reported `totalCount` is reached.
    /// Records without a usable SKU or name are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Any [`ApiloError`] from the per-page fetch, plus
    /// [`ApiloError::PaginationLimit`] as a runaway guard.
    pub async fn fetch_all_products(&self) -> Result<Vec<Product>, ApiloError> {
        let limit = self.page_size.max(1);
        let mut offset = 0u64;
        let mut products = Vec::new();

        for page_index in 0usize.. {
            if page_index >= MAX_PAGES {
                return Err(ApiloError::PaginationLimit {
                    max_pages: MAX_PAGES,
                });
            }

            let page = self.fetch_products_page(limit, offset).await?;
            let fetched = page.products.len();
            offset += fetched as u64;

            for raw in page.products {
                let raw_id = raw.id;
                match normalize_product(raw) {
                    Some(product) => products.push(product),
                    None => {
                        tracing::warn!(?raw_id, "skipping Apilo product missing sku or name");
                    }
                }
            }

            let done = fetched == 0
                || fetched < limit as usize
                || page.total_count.is_some_and(|total| offset >= total);
            if done {
                break;
            }
        }

        Ok(products)
    }

    /// Returns a usable access token, refreshing under the lock when the
    /// held one is expired. The mutex makes the refresh single-flight.
    async fn current_access_token(&self) -> Result<String, ApiloError> {
        let mut guard = self.token.lock().await;
        let token = guard.as_ref().ok_or(ApiloError::MissingToken)?;
        if !token.is_expired(Utc::now()) {
            return Ok(token.access_token.clone());
        }

        let refresh_token = token.refresh_token.clone();
        tracing::info!("access token expired, refreshing");
        let refreshed = self
            .request_token(serde_json::json!({
                "grantType": "refresh_token",
                "token": refresh_token,
            }))
            .await?;
        let access = refreshed.access_token.clone();
        *guard = Some(refreshed);
        Ok(access)
    }

    /// Unconditional refresh, used after a 401 that the expiry check did
    /// not predict.
    async fn force_refresh(&self) -> Result<String, ApiloError> {
        let mut guard = self.token.lock().await;
        let refresh_token = match guard.as_ref() {
            Some(token) => token.refresh_token.clone(),
            None => return Err(ApiloError::MissingToken),
        };
        let refreshed = self
            .request_token(serde_json::json!({
                "grantType": "refresh_token",
                "token": refresh_token,
            }))
            .await?;
        let access = refreshed.access_token.clone();
        *guard = Some(refreshed);
        Ok(access)
    }

    async fn request_token(&self, body: serde_json::Value) -> Result<TokenSet, ApiloError> {
        let url = self.token_url()?;
        let response = self
            .client
            .post(url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiloError::Auth {
                status: status.as_u16(),
                body: snippet(&text),
            });
        }

        let envelope: TokenResponse =
            serde_json::from_str(&text).map_err(|e| ApiloError::Deserialize {
                context: "token endpoint response".to_owned(),
                source: e,
            })?;
        let expires_at = envelope.expires_at();
        Ok(TokenSet::new(
            envelope.access_token,
            envelope.refresh_token,
            expires_at,
        ))
    }

    async fn products_request(
        &self,
        access_token: &str,
        limit: u32,
        offset: u64,
    ) -> Result<reqwest::Response, ApiloError> {
        let mut url = self.products_url()?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        Ok(self
            .client
            .get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?)
    }

    async fn decode_products(
        response: reqwest::Response,
    ) -> Result<ApiloProductsResponse, ApiloError> {
        let status = response.status();
        let url = response.url().to_string();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ApiloError::UnexpectedStatus {
                status: status.as_u16(),
                url,
                body: snippet(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| ApiloError::Deserialize {
            context: format!("products page from {url}"),
            source: e,
        })
    }

    fn token_url(&self) -> Result<Url, ApiloError> {
        self.base_url
            .join("rest/auth/token/")
            .map_err(|e| ApiloError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn products_url(&self) -> Result<Url, ApiloError> {
        self.base_url
            .join("rest/api/warehouse/product/")
            .map_err(|e| ApiloError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}
