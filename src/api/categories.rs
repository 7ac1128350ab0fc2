//! Category API endpoints
//!
//! - GET /api/categories - Every category

use axum::{extract::State, routing::get, Router};

use crate::api::middleware::{ApiError, AppState, CachedJson};

pub fn router() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories))
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Result<CachedJson, ApiError> {
    state.content.categories().await.map(CachedJson).map_err(|e| {
        tracing::error!("Error fetching categories: {}", e);
        ApiError::internal_error("Failed to fetch categories")
    })
}
