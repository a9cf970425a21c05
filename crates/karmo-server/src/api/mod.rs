mod apilo;
mod catalog;
mod categories;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::catalog::{CatalogError, CatalogService};
use crate::middleware::request_id;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

/// Error body per the storefront contract: `{ "error": "<message>" }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    /// An upstream fetch/parse failure. Everything bubbles out as a 500
    /// with the error message echoed for diagnostics — there is no local
    /// recovery or fallback catalog.
    pub(super) fn upstream(request_id: &str, err: &CatalogError) -> Self {
        tracing::error!(request_id, error = %err, "catalog query failed");
        Self {
            error: err.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(super) fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
}

/// All origins are permitted: the catalog surface is public, read-mostly
/// and consumed straight from browsers.
fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog", get(catalog::get_catalog))
        .route("/categories", get(categories::get_categories))
        .route("/apilo/token", post(apilo::authorize))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthData { status: "ok" })
}
