//! Content service
//!
//! Proxy semantics for every public resource: build the fixed upstream
//! request, serve it from the response cache when possible, otherwise fetch
//! from the CMS and remember the body. Raw JSON is relayed verbatim by the
//! API layer; typed accessors back the server-rendered pages.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::{CacheLayer, MemoryCache};
use crate::cms::{CmsClient, CmsError, CmsRequest};
use crate::models::{Article, Category, GlobalContent, HomepageContent, ListResponse, SingleResponse};

/// Default locale when a request does not name one
pub const DEFAULT_LOCALE: &str = "en";

/// Parameters of an article list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleListParams {
    pub locale: String,
    pub page: u32,
    pub page_size: u32,
    pub category: Option<String>,
}

impl Default for ArticleListParams {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            page: 1,
            page_size: 10,
            category: None,
        }
    }
}

impl ArticleListParams {
    fn request(&self) -> CmsRequest {
        CmsRequest::articles(&self.locale, self.page, self.page_size, self.category.as_deref())
    }
}

/// Read-through access to CMS content
pub struct ContentService {
    cms: Arc<dyn CmsClient>,
    cache: Option<Arc<MemoryCache>>,
}

impl ContentService {
    /// Create a new content service; `cache` is `None` when caching is disabled
    pub fn new(cms: Arc<dyn CmsClient>, cache: Option<Arc<MemoryCache>>) -> Self {
        Self { cms, cache }
    }

    /// Fetch an upstream request through the response cache
    async fn fetch(&self, request: &CmsRequest) -> Result<Value, CmsError> {
        self.fetch_checked(request, |_| Ok(())).await
    }

    /// Like `fetch`, but a body rejected by `check` is an error and is not cached
    async fn fetch_checked<F>(&self, request: &CmsRequest, check: F) -> Result<Value, CmsError>
    where
        F: Fn(&Value) -> Result<(), CmsError>,
    {
        let key = request.path_and_query();

        if let Some(cache) = &self.cache {
            match cache.get::<Value>(&key).await {
                Ok(Some(body)) => {
                    tracing::debug!("Cache hit: {}", key);
                    return Ok(body);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
            }
        }

        let body = self.cms.fetch(request).await?;
        check(&body)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &body, cache.default_ttl()).await {
                tracing::warn!("Cache write failed for {}: {}", key, e);
            }
        }

        Ok(body)
    }

    /// Paginated article list, relayed verbatim
    pub async fn list_articles(&self, params: &ArticleListParams) -> Result<Value, CmsError> {
        self.fetch(&params.request()).await
    }

    /// Single article by slug: the first entry of the filtered list, or `None`
    pub async fn article_by_slug(&self, locale: &str, slug: &str) -> Result<Option<Value>, CmsError> {
        let body = self
            .fetch_checked(&CmsRequest::article_by_slug(locale, slug), |body| {
                data_array(body).map(|_| ())
            })
            .await?;

        Ok(data_array(&body)?.first().cloned())
    }

    /// Category list, relayed verbatim
    pub async fn categories(&self) -> Result<Value, CmsError> {
        self.fetch(&CmsRequest::categories()).await
    }

    /// Global settings, relayed verbatim
    pub async fn global(&self, locale: &str) -> Result<Value, CmsError> {
        self.fetch(&CmsRequest::global(locale)).await
    }

    /// Homepage sections, relayed verbatim
    pub async fn homepage(&self, locale: &str) -> Result<Value, CmsError> {
        self.fetch(&CmsRequest::homepage(locale)).await
    }

    /// Typed article list for rendering
    pub async fn article_list(&self, params: &ArticleListParams) -> Result<ListResponse<Article>, CmsError> {
        decode(self.list_articles(params).await?)
    }

    /// Typed article lookup for rendering
    pub async fn article(&self, locale: &str, slug: &str) -> Result<Option<Article>, CmsError> {
        match self.article_by_slug(locale, slug).await? {
            Some(entry) => decode(crate::models::envelope::flatten_entry(entry)).map(Some),
            None => Ok(None),
        }
    }

    /// Typed category list for rendering
    pub async fn category_list(&self) -> Result<ListResponse<Category>, CmsError> {
        decode(self.categories().await?)
    }

    /// Typed global settings; `None` when the single type has no entry
    pub async fn global_content(&self, locale: &str) -> Result<Option<GlobalContent>, CmsError> {
        decode::<SingleResponse<GlobalContent>>(self.global(locale).await?).map(|r| r.data)
    }

    /// Typed homepage sections; `None` when the single type has no entry
    pub async fn homepage_content(&self, locale: &str) -> Result<Option<HomepageContent>, CmsError> {
        decode::<SingleResponse<HomepageContent>>(self.homepage(locale).await?).map(|r| r.data)
    }

    /// Number of cached upstream responses (approximate)
    pub fn cached_entries(&self) -> u64 {
        self.cache.as_ref().map_or(0, |cache| cache.entry_count())
    }

    /// Drop cached responses matching the given glob patterns.
    /// Returns the number of removed entries.
    pub async fn invalidate(&self, patterns: &[&str]) -> u64 {
        let Some(cache) = &self.cache else {
            return 0;
        };

        let mut removed = 0;
        for pattern in patterns {
            match cache.delete_pattern(pattern).await {
                Ok(count) => removed += count,
                Err(e) => tracing::warn!("Cache invalidation failed for {}: {}", pattern, e),
            }
        }
        removed
    }
}

fn data_array(body: &Value) -> Result<&Vec<Value>, CmsError> {
    body.get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| CmsError::Decode("article lookup returned no data array".to_string()))
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, CmsError> {
    serde_json::from_value(body).map_err(|e| CmsError::Decode(e.to_string()))
}
