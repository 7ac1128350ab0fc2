//! Article API endpoints
//!
//! - GET /api/articles - Paginated list, newest first
//! - GET /api/articles/{slug} - Single article with its relations

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, CachedJson};
use crate::services::{ArticleListParams, DEFAULT_LOCALE};

/// Query parameters for listing articles.
/// Values that do not parse fall back to their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListArticlesQuery {
    pub locale: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub category: Option<String>,
}

impl ListArticlesQuery {
    pub fn into_params(self) -> ArticleListParams {
        let defaults = ArticleListParams::default();
        ArticleListParams {
            locale: locale_or_default(self.locale),
            page: positive_or(self.page.as_deref(), defaults.page),
            page_size: positive_or(self.page_size.as_deref(), defaults.page_size),
            category: self.category.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Query parameters accepted by single-entry endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

impl LocaleQuery {
    pub fn locale(self) -> String {
        locale_or_default(self.locale)
    }
}

pub(crate) fn locale_or_default(locale: Option<String>) -> String {
    locale
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

fn positive_or(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/articles/", get(missing_slug))
        .route("/articles/{slug}", get(get_article))
}

/// GET /api/articles
async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<CachedJson, ApiError> {
    let params = query.into_params();

    state.content.list_articles(&params).await.map(CachedJson).map_err(|e| {
        tracing::error!("Error fetching articles: {}", e);
        ApiError::internal_error("Failed to fetch articles")
    })
}

/// GET /api/articles/{slug}
async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<CachedJson, ApiError> {
    if slug.trim().is_empty() {
        return Err(ApiError::bad_request("Slug parameter is required"));
    }

    let article = state
        .content
        .article_by_slug(&query.locale(), &slug)
        .await
        .map_err(|e| {
            tracing::error!("Error fetching article {}: {}", slug, e);
            ApiError::internal_error("Failed to fetch article")
        })?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;

    Ok(CachedJson(json!({ "data": article })))
}

async fn missing_slug() -> ApiError {
    ApiError::bad_request("Slug parameter is required")
}
