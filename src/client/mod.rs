//! Frontend data client
//!
//! Typed access to storefront content. In `Proxy` mode requests go to the
//! cached `/api` routes of a deployed site with simplified parameters; in
//! `Direct` mode the CMS is queried itself with the full populate
//! directives, which is what local development against a CMS instance wants.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

use crate::cms::{CmsQuery, CmsRequest};
use crate::config::{ClientConfig, ClientMode, CmsConfig};
use crate::models::{Article, Category, GlobalContent, HomepageContent, ListResponse, SingleResponse};
use crate::services::DEFAULT_LOCALE;

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to create HTTP client: {0}")]
    Build(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Status(u16),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Content client for the storefront API
pub struct SiteClient {
    http: reqwest::Client,
    mode: ClientMode,
    api_base: String,
    cms_url: String,
    cms_token: Option<String>,
    media_base: String,
    locale: RwLock<String>,
}

impl SiteClient {
    pub fn new(config: &ClientConfig, cms: &CmsConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cms.timeout_seconds))
            .user_agent(concat!("kickoff/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            mode: config.mode,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            cms_url: cms.url.trim_end_matches('/').to_string(),
            cms_token: cms.token.clone().filter(|t| !t.is_empty()),
            media_base: config.media_url.trim_end_matches('/').to_string(),
            locale: RwLock::new(DEFAULT_LOCALE.to_string()),
        })
    }

    pub fn mode(&self) -> ClientMode {
        self.mode
    }

    /// Locale sent with every subsequent request
    pub fn set_locale(&self, locale: &str) {
        let locale = locale.trim();
        let locale = if locale.is_empty() { DEFAULT_LOCALE } else { locale };
        if let Ok(mut current) = self.locale.write() {
            *current = locale.to_string();
        }
    }

    pub fn locale(&self) -> String {
        self.locale
            .read()
            .map(|l| l.clone())
            .unwrap_or_else(|_| DEFAULT_LOCALE.to_string())
    }

    /// Paginated article list, newest first
    pub async fn get_articles(&self, page: u32, page_size: u32) -> Result<ListResponse<Article>, ClientError> {
        self.article_list(page, page_size, None).await
    }

    /// Articles of one category
    pub async fn get_articles_by_category(
        &self,
        category_slug: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ListResponse<Article>, ClientError> {
        self.article_list(page, page_size, Some(category_slug)).await
    }

    /// Single article; `None` when no article has this slug
    pub async fn get_article_by_slug(&self, slug: &str) -> Result<Option<Article>, ClientError> {
        let locale = self.locale();
        match self.mode {
            ClientMode::Proxy => {
                let path = format!("/api/articles/{}", urlencoding::encode(slug));
                let query = CmsQuery::new().param("locale", &locale);
                match self.get::<SingleResponse<Article>>(self.proxy_url(&path, &query)).await {
                    Ok(response) => Ok(response.data),
                    Err(ClientError::Status(404)) => Ok(None),
                    Err(e) => Err(e),
                }
            }
            ClientMode::Direct => {
                let url = CmsRequest::article_by_slug(&locale, slug).url(&self.cms_url);
                let list: ListResponse<Article> = self.get(url).await?;
                Ok(list.data.into_iter().next())
            }
        }
    }

    /// Every category
    pub async fn get_categories(&self) -> Result<ListResponse<Category>, ClientError> {
        let url = match self.mode {
            ClientMode::Proxy => self.proxy_url("/api/categories", &CmsQuery::new()),
            ClientMode::Direct => CmsRequest::categories().url(&self.cms_url),
        };
        self.get(url).await
    }

    /// Homepage sections; any failure is logged and yields `None`
    pub async fn get_homepage(&self) -> Option<HomepageContent> {
        let locale = self.locale();
        let url = match self.mode {
            ClientMode::Proxy => self.proxy_url("/api/homepage", &CmsQuery::new().param("locale", &locale)),
            ClientMode::Direct => CmsRequest::homepage(&locale).url(&self.cms_url),
        };
        match self.get::<SingleResponse<HomepageContent>>(url).await {
            Ok(response) => response.data,
            Err(e) => {
                tracing::error!("Error fetching homepage: {}", e);
                None
            }
        }
    }

    /// Global settings; any failure is logged and yields `None`
    pub async fn get_global(&self) -> Option<GlobalContent> {
        let locale = self.locale();
        let url = match self.mode {
            ClientMode::Proxy => self.proxy_url("/api/global", &CmsQuery::new().param("locale", &locale)),
            ClientMode::Direct => CmsRequest::global(&locale).url(&self.cms_url),
        };
        match self.get::<SingleResponse<GlobalContent>>(url).await {
            Ok(response) => response.data,
            Err(e) => {
                tracing::error!("Error fetching global settings: {}", e);
                None
            }
        }
    }

    /// Absolute URL for a CMS media path
    pub fn media_url(&self, url: &str) -> String {
        media_url(&self.media_base, url)
    }

    async fn article_list(
        &self,
        page: u32,
        page_size: u32,
        category: Option<&str>,
    ) -> Result<ListResponse<Article>, ClientError> {
        let locale = self.locale();
        let url = match self.mode {
            ClientMode::Proxy => {
                let query = CmsQuery::new()
                    .param_opt("category", category)
                    .param("page", page)
                    .param("pageSize", page_size)
                    .param("locale", &locale);
                self.proxy_url("/api/articles", &query)
            }
            ClientMode::Direct => CmsRequest::articles(&locale, page, page_size, category).url(&self.cms_url),
        };
        self.get(url).await
    }

    fn proxy_url(&self, path: &str, query: &CmsQuery) -> String {
        if query.is_empty() {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}{}?{}", self.api_base, path, query)
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        tracing::debug!("GET {}", url);

        let mut request = self.http.get(&url);
        if self.mode == ClientMode::Direct {
            if let Some(token) = &self.cms_token {
                request = request.bearer_auth(token);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Resolve a CMS media path against `base`.
/// Absolute URLs are kept, empty input stays empty.
pub fn media_url(base: &str, url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
        return url.to_string();
    }

    let base = base.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{}{}", base, url)
    } else {
        format!("{}/{}", base, url)
    }
}

/// Format an ISO date as `Month D, YYYY`; anything unparseable is returned unchanged
pub fn format_date(iso: &str) -> String {
    let trimmed = iso.trim();
    let date = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => iso.to_string(),
    }
}
