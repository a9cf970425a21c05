//! Apilo REST response types.
//!
//! ## Observed shapes
//!
//! The token endpoint (`POST /rest/auth/token/`) answers both grant types
//! with the same envelope: `accessToken`, `refreshToken` and the
//! corresponding `…ExpireAt` timestamps. The expiry format has been seen
//! both with and without a colon in the zone offset, so it is kept as a raw
//! string and parsed leniently in [`TokenResponse::expires_at`].
//!
//! The product endpoint (`GET /rest/api/warehouse/product/`) returns
//! `{ "products": [...], "totalCount": n }`. Numeric fields (`quantity`,
//! `priceWithoutTax`, `priceWithTax`, `tax`, `weight`) arrive as JSON
//! numbers on some installations and as strings on others; they are modeled
//! as [`serde_json::Value`] and stringified during normalization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Envelope returned by the token endpoint for both grant types.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token_expire_at: Option<String>,
}

impl TokenResponse {
    /// Parses the reported expiry, tolerating a zone offset with or without
    /// a colon. `None` when the field is absent or unparsable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.access_token_expire_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}

/// Top-level response from the paginated product endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiloProductsResponse {
    #[serde(default)]
    pub products: Vec<ApiloProduct>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// A single warehouse product as Apilo reports it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiloProduct {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ean: Option<String>,
    /// `0` = inactive, `1` = active, `8` = archive.
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub quantity: Option<serde_json::Value>,
    #[serde(default)]
    pub price_without_tax: Option<serde_json::Value>,
    #[serde(default)]
    pub price_with_tax: Option<serde_json::Value>,
    #[serde(default)]
    pub tax: Option<serde_json::Value>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub weight: Option<serde_json::Value>,
    /// Category entries: either objects with a `name` field or bare strings.
    #[serde(default)]
    pub categories: Vec<serde_json::Value>,
    #[serde(default)]
    pub images: Vec<ApiloImage>,
    #[serde(default)]
    pub main_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiloImage {
    #[serde(default)]
    pub url: Option<String>,
}
