use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthorizeBody {
    pub auth_code: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AuthorizeResponse {
    pub status: &'static str,
}

/// One-time Apilo authorization-code exchange. The resulting token pair
/// stays inside the running process; nothing secret is echoed back.
pub(super) async fn authorize(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AuthorizeBody>,
) -> Result<Json<AuthorizeResponse>, ApiError> {
    match state.catalog.authorize_apilo(&body.auth_code).await {
        Ok(()) => Ok(Json(AuthorizeResponse {
            status: "authorized",
        })),
        Err(CatalogError::Config(message)) => Err(ApiError::bad_request(message)),
        Err(err) => Err(ApiError::upstream(&req_id.0, &err)),
    }
}
