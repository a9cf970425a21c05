use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use karmo_core::{build_category_tree, CategoryNode};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CategoriesQuery {
    /// Top-level group the navigation tree is built for, e.g. `psy`.
    pub grupa: Option<String>,
}

/// Builds the navigation tree for one top-level category group from a fresh
/// catalog snapshot.
pub(super) async fn get_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<Vec<CategoryNode>>, ApiError> {
    let Some(grupa) = query.grupa.as_deref().filter(|g| !g.is_empty()) else {
        return Err(ApiError::bad_request("missing required parameter: grupa"));
    };

    let products = state
        .catalog
        .fetch_catalog()
        .await
        .map_err(|e| ApiError::upstream(&req_id.0, &e))?;

    Ok(Json(build_category_tree(&products, grupa)))
}
