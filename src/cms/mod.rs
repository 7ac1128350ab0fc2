//! Upstream CMS access
//!
//! The proxy layer talks to the CMS through the [`CmsClient`] trait so
//! handlers and services can be exercised against an in-memory fake. The
//! production implementation is [`HttpCmsClient`].

mod http;
pub mod query;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpCmsClient;
pub use query::{CmsQuery, CmsRequest};

/// Upstream failures. Callers collapse all of them into a generic 500.
#[derive(Debug, Error)]
pub enum CmsError {
    /// The CMS could not be reached or the request timed out
    #[error("CMS request failed: {0}")]
    Transport(String),

    /// The CMS answered with a non-2xx status
    #[error("CMS API error: {0}")]
    Status(u16),

    /// The CMS answered 2xx but the body was not JSON
    #[error("Invalid CMS response: {0}")]
    Decode(String),
}

/// Read-only access to the CMS
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Issue a GET for the request and return the decoded JSON body
    async fn fetch(&self, request: &CmsRequest) -> Result<Value, CmsError>;
}
