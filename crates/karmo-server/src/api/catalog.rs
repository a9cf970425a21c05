use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use karmo_core::product::{filter_by_category_path, find_by_sku};
use karmo_core::slug::resolve_path;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CatalogQuery {
    /// Exact SKU lookup; wins over `kategoria` when both are present.
    pub sku: Option<String>,
    /// URL-style category path, e.g. `psy/sucha-karma/bezzbozowa`.
    pub kategoria: Option<String>,
}

/// The single externally-facing read operation: fetches a fresh catalog
/// snapshot and applies the optional SKU or category-path filter.
///
/// - `?sku=` returns the one matching product, or `null` — a missing SKU is
///   a valid empty result, never an error. Inactive products resolve here
///   so an existing cart line keeps working.
/// - `?kategoria=` returns active products matching the path, in feed order.
/// - No filter returns the full merged catalog.
pub(super) async fn get_catalog(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, ApiError> {
    let products = state
        .catalog
        .fetch_catalog()
        .await
        .map_err(|e| ApiError::upstream(&req_id.0, &e))?;

    if let Some(sku) = query.sku.as_deref() {
        let found = find_by_sku(&products, sku).cloned();
        return Ok(Json(found).into_response());
    }

    if let Some(path) = query.kategoria.as_deref() {
        let filtered = filter_by_category_path(products, path);
        let matched = resolve_path(
            filtered
                .iter()
                .flat_map(|p| p.categories.iter().map(String::as_str)),
            path,
        );
        tracing::debug!(
            path,
            matched_categories = ?matched,
            products = filtered.len(),
            "category filter applied"
        );
        return Ok(Json(filtered).into_response());
    }

    Ok(Json(products).into_response())
}
