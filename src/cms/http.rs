//! reqwest-backed CMS client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

use super::{CmsClient, CmsError, CmsRequest};
use crate::config::CmsConfig;

/// HTTP client for the CMS REST API
pub struct HttpCmsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCmsClient {
    /// Create a client from configuration.
    ///
    /// The bearer token, when configured, is attached to every request.
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| CmsError::Transport(format!("Invalid CMS token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("kickoff/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| CmsError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CmsClient for HttpCmsClient {
    async fn fetch(&self, request: &CmsRequest) -> Result<Value, CmsError> {
        let url = request.url(&self.base_url);
        tracing::debug!("CMS GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CmsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CmsError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = CmsConfig {
            url: "https://cms.example.com/".to_string(),
            ..CmsConfig::default()
        };
        let client = HttpCmsClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://cms.example.com");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let config = CmsConfig {
            token: Some("bad\ntoken".to_string()),
            ..CmsConfig::default()
        };
        assert!(matches!(HttpCmsClient::new(&config), Err(CmsError::Transport(_))));
    }

    #[tokio::test]
    async fn test_unreachable_cms_is_transport_error() {
        let config = CmsConfig {
            url: "http://127.0.0.1:9".to_string(),
            token: None,
            timeout_seconds: 2,
        };
        let client = HttpCmsClient::new(&config).unwrap();

        let result = client.fetch(&CmsRequest::categories()).await;
        assert!(matches!(result, Err(CmsError::Transport(_))));
    }
}
