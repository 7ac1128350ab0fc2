//! Revalidation webhook
//!
//! - POST /api/revalidate - Called by the CMS after content changes
//!
//! The route accepts every method so that non-POST calls get the JSON 405
//! body instead of axum's empty one. The secret is checked before the body
//! is looked at.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method},
    routing::any,
    Json, Router,
};
use serde_json::Value;

use crate::api::middleware::{ApiError, AppState};
use crate::services::{RevalidateError, RevalidateEvent, RevalidateResponse};

/// Header carrying the shared webhook secret
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

pub fn router() -> Router<AppState> {
    Router::new().route("/revalidate", any(revalidate))
}

/// POST /api/revalidate
async fn revalidate(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RevalidateResponse>, ApiError> {
    if method != Method::POST {
        return Err(ApiError::method_not_allowed());
    }

    let secret = headers.get(WEBHOOK_SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !state.revalidation.authorize(secret) {
        tracing::warn!("Rejected revalidation request with invalid secret");
        return Err(ApiError::unauthorized());
    }

    let event = parse_event(&body)?;
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());

    state
        .revalidation
        .revalidate(&event, host)
        .await
        .map(Json)
        .map_err(|e| match e {
            RevalidateError::MissingHost => ApiError::bad_request("Missing host"),
            RevalidateError::InvalidBody => ApiError::bad_request("Invalid webhook payload"),
        })
}

/// An empty body is an event with no fields
fn parse_event(body: &[u8]) -> Result<RevalidateEvent, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RevalidateEvent::default());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid webhook payload"))?;
    RevalidateEvent::from_json(&value).map_err(|e| ApiError::bad_request(e.to_string()))
}
