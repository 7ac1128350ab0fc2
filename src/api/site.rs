//! Site-wide content endpoints
//!
//! - GET /api/global - Site name, description and navigation labels
//! - GET /api/homepage - Hero, collection and footer sections
//! - GET /healthz - Liveness and request statistics

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::articles::LocaleQuery;
use crate::api::middleware::{ApiError, AppState, CachedJson};

/// Response for the health endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub avg_response_time_us: f64,
    pub cache_entries: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/global", get(get_global))
        .route("/homepage", get(get_homepage))
}

/// GET /api/global
async fn get_global(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
) -> Result<CachedJson, ApiError> {
    state.content.global(&query.locale()).await.map(CachedJson).map_err(|e| {
        tracing::error!("Error fetching global settings: {}", e);
        ApiError::internal_error("Failed to fetch global settings")
    })
}

/// GET /api/homepage
async fn get_homepage(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
) -> Result<CachedJson, ApiError> {
    state.content.homepage(&query.locale()).await.map(CachedJson).map_err(|e| {
        tracing::error!("Error fetching homepage: {}", e);
        ApiError::internal_error("Failed to fetch homepage")
    })
}

/// GET /healthz
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = &state.request_stats;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: stats.uptime_seconds(),
        total_requests: stats.total_requests(),
        avg_response_time_us: stats.avg_response_time_us(),
        cache_entries: state.content.cached_entries(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{server, state_with};
    use crate::cms::CmsRequest;
    use crate::services::content::tests::FakeCms;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_global_uses_locale() {
        let body = json!({"data": {"siteName": "Kick Off Couture"}});
        let cms = FakeCms::new().respond(CmsRequest::global("fr"), body.clone());
        let server = server(state_with(cms, None, None));

        let response = server.get("/api/global").add_query_param("locale", "fr").await;

        response.assert_status_ok();
        response.assert_json(&body);
        assert_eq!(response.header("cdn-cache-control"), "max-age=300");
    }

    #[tokio::test]
    async fn test_global_failure() {
        let cms = FakeCms::new().fail(CmsRequest::global("en"), 500);
        let server = server(state_with(cms, None, None));

        let response = server.get("/api/global").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({"error": "Failed to fetch global settings"}));
    }

    #[tokio::test]
    async fn test_homepage() {
        let body = json!({"data": {"hero": {"title": "Kick off"}}});
        let cms = FakeCms::new().respond(CmsRequest::homepage("en"), body.clone());
        let server = server(state_with(cms, None, None));

        let response = server.get("/api/homepage").await;

        response.assert_status_ok();
        response.assert_json(&body);
        assert_eq!(response.header("cache-control"), "s-maxage=300, stale-while-revalidate=600");
    }

    #[tokio::test]
    async fn test_homepage_failure() {
        let server = server(state_with(FakeCms::new(), None, None));

        let response = server.get("/api/homepage").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({"error": "Failed to fetch homepage"}));
    }

    #[tokio::test]
    async fn test_health() {
        let server = server(state_with(FakeCms::new(), None, None));

        let response = server.get("/healthz").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["cache_entries"], 0);
    }
}
