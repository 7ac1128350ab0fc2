//! Revalidation service
//!
//! Turns a CMS content-change event into the set of affected public API URLs,
//! drops the matching in-process cache entries and, when a CDN purger is
//! configured, purges every URL concurrently. A failed purge is logged and
//! counted, never retried.

use chrono::{SecondsFormat, Utc};
use futures::future::join_all;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;
use thiserror::Error;

use super::content::ContentService;
use super::purge::CdnPurger;

type HmacSha256 = Hmac<Sha256>;

const SECRET_CONTEXT: &[u8] = b"kickoff-webhook-secret";

/// Message returned when no CDN purger is configured
pub const NATURAL_EXPIRY_MESSAGE: &str = "Cache will expire naturally based on TTL settings";

/// Revalidation errors
#[derive(Debug, Error, PartialEq)]
pub enum RevalidateError {
    #[error("Invalid webhook payload")]
    InvalidBody,

    #[error("Missing host")]
    MissingHost,
}

/// Content type named by a webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentModel {
    Article,
    Category,
    Homepage,
    Global,
    /// Unknown or absent model: everything is considered stale
    Other(Option<String>),
}

impl ContentModel {
    pub fn parse(model: Option<&str>) -> Self {
        match model {
            Some("article") => Self::Article,
            Some("category") => Self::Category,
            Some("homepage") => Self::Homepage,
            Some("global") => Self::Global,
            other => Self::Other(other.map(str::to_string)),
        }
    }

    /// Public API paths affected by a change to this model
    pub fn paths(&self, slug: Option<&str>) -> Vec<String> {
        match self {
            Self::Article => {
                let mut paths = vec!["/api/articles".to_string()];
                if let Some(slug) = slug {
                    paths.push(format!("/api/articles/{}", urlencoding::encode(slug)));
                }
                paths
            }
            Self::Category => vec!["/api/categories".to_string(), "/api/articles".to_string()],
            Self::Homepage => vec!["/api/homepage".to_string()],
            Self::Global => vec!["/api/global".to_string()],
            Self::Other(_) => vec![
                "/api/articles".to_string(),
                "/api/categories".to_string(),
                "/api/homepage".to_string(),
                "/api/global".to_string(),
            ],
        }
    }

    /// Cache key patterns of the upstream responses behind those paths
    pub fn cache_patterns(&self) -> &'static [&'static str] {
        match self {
            Self::Article => &["/api/articles*"],
            Self::Category => &["/api/categories*", "/api/articles*"],
            Self::Homepage => &["/api/homepage*"],
            Self::Global => &["/api/global*"],
            Self::Other(_) => &["*"],
        }
    }
}

/// Webhook payload: `{ model, event, entry: { slug } }`, every field optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevalidateEvent {
    pub model: Option<String>,
    pub event: Option<String>,
    pub slug: Option<String>,
}

impl RevalidateEvent {
    /// Read the payload leniently; only a non-object body is rejected
    pub fn from_json(body: &Value) -> Result<Self, RevalidateError> {
        let object = body.as_object().ok_or(RevalidateError::InvalidBody)?;
        let text = |value: Option<&Value>| {
            value
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            model: text(object.get("model")),
            event: text(object.get("event")),
            slug: text(object.get("entry").and_then(|entry| entry.get("slug"))),
        })
    }

    pub fn content_model(&self) -> ContentModel {
        ContentModel::parse(self.model.as_deref())
    }
}

/// Absolute URLs to purge for an event on the given host
pub fn purge_urls(host: &str, model: &ContentModel, slug: Option<&str>) -> Vec<String> {
    model
        .paths(slug)
        .into_iter()
        .map(|path| format!("https://{}{}", host, path))
        .collect()
}

/// Aggregated outcome of a purge fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    pub successes: usize,
    pub failures: usize,
}

/// Purge every URL concurrently and wait for all outcomes
pub async fn fan_out(purger: &dyn CdnPurger, urls: &[String]) -> PurgeSummary {
    let results = join_all(urls.iter().map(|url| purger.purge(url))).await;

    let mut summary = PurgeSummary::default();
    let mut errors = Vec::new();
    for (url, result) in urls.iter().zip(results) {
        match result {
            Ok(_) => summary.successes += 1,
            Err(e) => {
                summary.failures += 1;
                errors.push(format!("{}: {}", url, e));
            }
        }
    }

    tracing::info!(
        "Purge complete: {} succeeded, {} failed",
        summary.successes,
        summary.failures
    );
    if !errors.is_empty() {
        tracing::error!("Cache purge failures: {:?}", errors);
    }

    summary
}

/// Constant-time check of the `x-webhook-secret` header.
/// With no configured secret nothing is accepted.
pub fn verify_secret(expected: Option<&str>, provided: Option<&str>) -> bool {
    let (Some(expected), Some(provided)) = (expected, provided) else {
        return false;
    };
    if expected.is_empty() {
        return false;
    }

    let (Ok(mut expected_mac), Ok(mut provided_mac)) = (
        HmacSha256::new_from_slice(expected.as_bytes()),
        HmacSha256::new_from_slice(provided.as_bytes()),
    ) else {
        return false;
    };
    expected_mac.update(SECRET_CONTEXT);
    provided_mac.update(SECRET_CONTEXT);

    let tag = expected_mac.finalize().into_bytes();
    provided_mac.verify_slice(&tag).is_ok()
}

/// Webhook response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RevalidateResponse {
    #[serde(rename_all = "camelCase")]
    Purged {
        revalidated: bool,
        purged_urls: Vec<String>,
        successes: usize,
        failures: usize,
        timestamp: String,
    },
    Expiring {
        revalidated: bool,
        message: String,
        timestamp: String,
    },
}

/// Webhook orchestration: authenticate, invalidate, purge
pub struct RevalidationService {
    content: Arc<ContentService>,
    purger: Option<Arc<dyn CdnPurger>>,
    secret: Option<String>,
    public_host: Option<String>,
}

impl RevalidationService {
    pub fn new(
        content: Arc<ContentService>,
        purger: Option<Arc<dyn CdnPurger>>,
        secret: Option<String>,
        public_host: Option<String>,
    ) -> Self {
        Self {
            content,
            purger,
            secret,
            public_host: public_host.map(|h| normalize_host(&h)).filter(|h| !h.is_empty()),
        }
    }

    pub fn authorize(&self, provided: Option<&str>) -> bool {
        verify_secret(self.secret.as_deref(), provided)
    }

    pub fn purging_enabled(&self) -> bool {
        self.purger.is_some()
    }

    /// Handle an authenticated event. `request_host` is the `Host` header,
    /// used when no public host is configured.
    pub async fn revalidate(
        &self,
        event: &RevalidateEvent,
        request_host: Option<&str>,
    ) -> Result<RevalidateResponse, RevalidateError> {
        let model = event.content_model();
        tracing::info!(
            "Revalidation triggered for model: {:?}, event: {:?}, slug: {:?}",
            event.model,
            event.event,
            event.slug
        );

        let host = self
            .public_host
            .clone()
            .or_else(|| request_host.map(normalize_host).filter(|h| !h.is_empty()));

        let purge = match &self.purger {
            Some(purger) => {
                let host = host.ok_or(RevalidateError::MissingHost)?;
                Some((purger.clone(), host))
            }
            None => None,
        };

        let removed = self.content.invalidate(model.cache_patterns()).await;
        tracing::debug!("Invalidated {} cached responses", removed);

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let Some((purger, host)) = purge else {
            return Ok(RevalidateResponse::Expiring {
                revalidated: true,
                message: NATURAL_EXPIRY_MESSAGE.to_string(),
                timestamp,
            });
        };

        tracing::info!("Deployment domain: {}", host);
        let urls = purge_urls(&host, &model, event.slug.as_deref());
        tracing::info!("URLs to purge: {:?}", urls);

        let summary = fan_out(purger.as_ref(), &urls).await;

        Ok(RevalidateResponse::Purged {
            revalidated: true,
            purged_urls: urls,
            successes: summary.successes,
            failures: summary.failures,
            timestamp,
        })
    }
}

fn normalize_host(host: &str) -> String {
    host.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}
