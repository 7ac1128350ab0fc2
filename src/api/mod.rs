//! API layer - HTTP handlers and routing
//!
//! This module contains every HTTP endpoint of the storefront edge:
//! - Article API endpoints (CMS proxy)
//! - Category API endpoints (CMS proxy)
//! - Global settings and homepage endpoints (CMS proxy)
//! - Revalidation webhook
//! - Server-rendered pages and bundled assets
//! - Health endpoint

pub mod articles;
pub mod categories;
pub mod middleware;
pub mod pages;
pub mod revalidate;
pub mod site;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, CachedJson, RequestStats};

/// Build the `/api` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .merge(articles::router())
        .merge(categories::router())
        .merge(site::router())
        .merge(revalidate::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(revalidate::WEBHOOK_SECRET_HEADER),
        ]);
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) if cors_origin != "*" => cors.allow_origin(origin),
        _ => {
            if cors_origin != "*" {
                tracing::warn!("Invalid CORS origin {:?}, allowing any origin", cors_origin);
            }
            cors.allow_origin(tower_http::cors::Any)
        }
    };

    Router::new()
        .nest("/api", build_api_router())
        .route("/healthz", get(site::health))
        .merge(pages::router())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
