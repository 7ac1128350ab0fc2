//! CDN purge client
//!
//! One purge call per public URL: `GET {endpoint}?url=<enc>&teamId=<id>` with
//! the API token as bearer credentials.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::CdnConfig;

/// Purge errors
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("Failed to create purge client: {0}")]
    Client(String),

    #[error("Purge request failed: {0}")]
    Transport(String),

    #[error("Purge failed: {status} {body}")]
    Rejected { status: u16, body: String },
}

/// Successful purge outcome
#[derive(Debug, Clone, PartialEq)]
pub struct PurgeReceipt {
    pub url: String,
    pub status: u16,
    pub body: Value,
}

/// Purges a single public URL from the CDN edge cache
#[async_trait]
pub trait CdnPurger: Send + Sync {
    async fn purge(&self, url: &str) -> Result<PurgeReceipt, PurgeError>;
}

/// Purger backed by the Vercel cache purge API
pub struct VercelPurger {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    team_id: String,
}

impl VercelPurger {
    /// Build a purger from configuration, or `None` when purging is not configured
    pub fn from_config(config: &CdnConfig) -> Result<Option<Self>, PurgeError> {
        let (Some(token), Some(team_id)) = (&config.token, &config.team_id) else {
            return Ok(None);
        };
        if !config.purge_enabled() {
            return Ok(None);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PurgeError::Client(e.to_string()))?;

        Ok(Some(Self {
            client,
            endpoint: config.purge_endpoint.clone(),
            token: token.clone(),
            team_id: team_id.clone(),
        }))
    }

    /// Full purge request URL for a public URL
    pub fn purge_request_url(&self, url: &str) -> String {
        format!(
            "{}?url={}&teamId={}",
            self.endpoint,
            urlencoding::encode(url),
            urlencoding::encode(&self.team_id)
        )
    }
}

#[async_trait]
impl CdnPurger for VercelPurger {
    async fn purge(&self, url: &str) -> Result<PurgeReceipt, PurgeError> {
        tracing::info!("Purging: {}", url);

        let response = self
            .client
            .get(self.purge_request_url(url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PurgeError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PurgeError::Transport(e.to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        tracing::info!("Purge result for {}: {} {}", url, status.as_u16(), body);

        if !status.is_success() {
            return Err(PurgeError::Rejected {
                status: status.as_u16(),
                body: body.to_string(),
            });
        }

        Ok(PurgeReceipt {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> CdnConfig {
        CdnConfig {
            token: Some("tok".to_string()),
            team_id: Some("team_1".to_string()),
            ..CdnConfig::default()
        }
    }

    #[test]
    fn test_from_config_requires_both_values() {
        assert!(VercelPurger::from_config(&CdnConfig::default()).unwrap().is_none());

        let token_only = CdnConfig {
            team_id: None,
            ..configured()
        };
        assert!(VercelPurger::from_config(&token_only).unwrap().is_none());

        let empty_team = CdnConfig {
            team_id: Some(String::new()),
            ..configured()
        };
        assert!(VercelPurger::from_config(&empty_team).unwrap().is_none());

        assert!(VercelPurger::from_config(&configured()).unwrap().is_some());
    }

    #[test]
    fn test_purge_request_url_encodes_target() {
        let purger = VercelPurger::from_config(&configured()).unwrap().unwrap();

        assert_eq!(
            purger.purge_request_url("https://shop.example.com/api/articles"),
            "https://api.vercel.com/v1/purge?url=https%3A%2F%2Fshop.example.com%2Fapi%2Farticles&teamId=team_1"
        );
    }

    #[tokio::test]
    async fn test_purge_unreachable_endpoint_is_transport_error() {
        let config = CdnConfig {
            purge_endpoint: "http://127.0.0.1:9/v1/purge".to_string(),
            timeout_seconds: 2,
            ..configured()
        };
        let purger = VercelPurger::from_config(&config).unwrap().unwrap();

        let result = purger.purge("https://shop.example.com/api/global").await;
        assert!(matches!(result, Err(PurgeError::Transport(_))));
    }

    #[tokio::test]
    async fn test_purge_rejected_status() {
        use axum::{http::StatusCode, routing::get, Json, Router};

        let app = Router::new().route(
            "/v1/purge",
            get(|| async { (StatusCode::FORBIDDEN, Json(serde_json::json!({"error": "forbidden"}))) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = CdnConfig {
            purge_endpoint: format!("http://{}/v1/purge", addr),
            ..configured()
        };
        let purger = VercelPurger::from_config(&config).unwrap().unwrap();

        match purger.purge("https://shop.example.com/api/global").await {
            Err(PurgeError::Rejected { status, body }) => {
                assert_eq!(status, 403);
                assert!(body.contains("forbidden"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_purge_success_receipt() {
        use axum::{extract::Query, http::HeaderMap, routing::get, Json, Router};
        use std::collections::HashMap;

        let app = Router::new().route(
            "/v1/purge",
            get(|Query(params): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(serde_json::json!({
                    "url": params.get("url"),
                    "teamId": params.get("teamId"),
                    "auth": auth,
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = CdnConfig {
            purge_endpoint: format!("http://{}/v1/purge", addr),
            ..configured()
        };
        let purger = VercelPurger::from_config(&config).unwrap().unwrap();

        let receipt = purger.purge("https://shop.example.com/api/global").await.unwrap();
        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.body["url"], "https://shop.example.com/api/global");
        assert_eq!(receipt.body["teamId"], "team_1");
        assert_eq!(receipt.body["auth"], "Bearer tok");
    }
}
