//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The JSON error type returned by every handler
//! - Edge cache headers for proxied responses
//! - Request statistics reported by the health endpoint

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::services::{ContentService, MarkdownRenderer, RevalidationService};
use crate::theme::ThemeEngine;

// ============================================================================
// Request Statistics
// ============================================================================

/// Lightweight request statistics using atomic operations (no locks)
pub struct RequestStats {
    total_requests: AtomicU64,
    total_response_time_us: AtomicU64,
    start_time: Instant,
}

impl RequestStats {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request with its response time
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us.fetch_add(duration_us, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Average response time in microseconds
    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let total_time = self.total_response_time_us.load(Ordering::Relaxed);
        total_time as f64 / total as f64
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub content: Arc<ContentService>,
    pub revalidation: Arc<RevalidationService>,
    pub theme: Arc<ThemeEngine>,
    pub markdown: Arc<MarkdownRenderer>,
    pub request_stats: Arc<RequestStats>,
}

// ============================================================================
// Errors
// ============================================================================

/// Error response body: `{"error": "<message>"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip, default = "default_status")]
    pub status: StatusCode,
    pub error: String,
}

fn default_status() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Request statistics middleware
pub async fn request_stats_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    state.request_stats.record(start.elapsed().as_micros() as u64);
    response
}

// ============================================================================
// HTTP Cache Headers
// ============================================================================

/// Edge cache lifetime of proxied responses, in seconds
pub const EDGE_MAX_AGE: u32 = 300;

/// Window in which the edge may serve a stale copy while refetching
pub const STALE_WHILE_REVALIDATE: u32 = 600;

/// Header read by the CDN in preference to `Cache-Control`
pub const CDN_CACHE_CONTROL: HeaderName = HeaderName::from_static("cdn-cache-control");

/// Build Cache-Control header for shared caches
pub fn cache_control_edge(s_maxage: u32, stale_while_revalidate: u32) -> String {
    format!("s-maxage={}, stale-while-revalidate={}", s_maxage, stale_while_revalidate)
}

/// Build CDN-Cache-Control header
pub fn cdn_cache_control(max_age: u32) -> String {
    format!("max-age={}", max_age)
}

/// JSON body relayed from the CMS, sent with edge cache headers
#[derive(Debug)]
pub struct CachedJson(pub Value);

impl IntoResponse for CachedJson {
    fn into_response(self) -> Response {
        let mut response = Json(self.0).into_response();
        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&cache_control_edge(EDGE_MAX_AGE, STALE_WHILE_REVALIDATE)) {
            headers.insert(header::CACHE_CONTROL, value);
        }
        if let Ok(value) = HeaderValue::from_str(&cdn_cache_control(EDGE_MAX_AGE)) {
            headers.insert(CDN_CACHE_CONTROL, value);
        }
        response
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_cache_header_values() {
        assert_eq!(
            cache_control_edge(EDGE_MAX_AGE, STALE_WHILE_REVALIDATE),
            "s-maxage=300, stale-while-revalidate=600"
        );
        assert_eq!(cdn_cache_control(EDGE_MAX_AGE), "max-age=300");
    }

    #[tokio::test]
    async fn test_cached_json_headers() {
        let response = CachedJson(serde_json::json!({"data": []})).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "s-maxage=300, stale-while-revalidate=600"
        );
        assert_eq!(response.headers().get("CDN-Cache-Control").unwrap(), "max-age=300");
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_api_error_body() {
        let response = ApiError::not_found("Article not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Article not found"}));
    }

    #[test]
    fn test_api_error_statuses() {
        assert_eq!(ApiError::bad_request("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized().error, "Unauthorized");
        assert_eq!(ApiError::method_not_allowed().status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::internal_error("x").status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_request_stats() {
        let stats = RequestStats::new();
        assert_eq!(stats.avg_response_time_us(), 0.0);

        stats.record(100);
        stats.record(300);

        assert_eq!(stats.total_requests(), 2);
        assert_eq!(stats.avg_response_time_us(), 200.0);
    }

    #[tokio::test]
    async fn test_request_stats_middleware_counts_requests() {
        use crate::api::test_support::state_with;
        use crate::services::content::tests::FakeCms;
        use axum::{body::Body, middleware::from_fn_with_state, routing::get, Router};
        use tower::ServiceExt;

        let state = state_with(FakeCms::new(), None, None);
        let stats = state.request_stats.clone();
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(state.clone(), request_stats_middleware))
            .with_state(state);

        let request = axum::http::Request::builder().uri("/ping").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(stats.total_requests(), 1);
    }
}
