//! Server-rendered storefront pages
//!
//! - GET / - Hero and collection sections
//! - GET /blog - Article index with category filter and pagination
//! - GET /blog/{slug} - Single article, 404 page when missing
//! - GET /assets/{file} - Bundled stylesheet and artwork
//!
//! Pages never fail because the CMS does: every fetch error is logged and
//! the affected section falls back to its built-in copy.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::api::articles::ListArticlesQuery;
use crate::api::middleware::AppState;
use crate::cms::CmsError;
use crate::models::HomepageContent;
use crate::site::{
    locale_cookie, locale_from_cookie, ArticleCard, ArticleView, CollectionView, FooterView, HeroView,
    LanguageSwitcher, NavbarView,
};
use crate::theme;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/blog", get(blog))
        .route("/blog/{slug}", get(article))
        .route("/assets/{file}", get(serve_asset))
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    locale: Option<String>,
}

/// Selected language plus the cookie to set when the query changed it
fn resolve_language(query_locale: Option<&str>, headers: &HeaderMap) -> (LanguageSwitcher, Option<String>) {
    match query_locale.filter(|l| !l.trim().is_empty()) {
        Some(locale) => {
            let language = LanguageSwitcher::new(Some(locale));
            let cookie = locale_cookie(language.locale());
            (language, Some(cookie))
        }
        None => {
            let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
            (LanguageSwitcher::new(locale_from_cookie(cookie_header)), None)
        }
    }
}

fn or_fallback<T>(result: Result<Option<T>, CmsError>, what: &str) -> Option<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch {}, using fallback: {}", what, e);
        None
    })
}

/// Context shared by every page: navbar, footer, language and SEO
async fn page_context(
    state: &AppState,
    language: &LanguageSwitcher,
    request_path: &str,
) -> (TeraContext, Option<HomepageContent>) {
    let locale = language.locale();
    let (global, homepage) = futures::join!(
        state.content.global_content(locale),
        state.content.homepage_content(locale)
    );
    let global = or_fallback(global, "global settings");
    let homepage = or_fallback(homepage, "homepage");

    let site = &state.config.site;
    let seo = homepage
        .as_ref()
        .and_then(|h| h.seo.clone())
        .or_else(|| global.as_ref().and_then(|g| g.default_seo.clone()));

    let mut context = TeraContext::new();
    context.insert("language", language);
    context.insert("navbar", &NavbarView::resolve(global.as_ref(), &site.login_url, &site.cart_url));
    context.insert("footer", &FooterView::resolve(homepage.as_ref().and_then(|h| h.footer.as_ref())));
    context.insert("request_path", request_path);
    context.insert("seo", &seo);

    (context, homepage)
}

fn render_page(
    state: &AppState,
    status: StatusCode,
    template: &str,
    context: &TeraContext,
    set_cookie: Option<String>,
) -> Response {
    let html = state.theme.render_with_fallback(template, context);
    let mut response = (status, Html(html)).into_response();

    if let Some(value) = set_cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    response
}

/// GET /
async fn home(State(state): State<AppState>, Query(query): Query<PageQuery>, headers: HeaderMap) -> Response {
    let (language, set_cookie) = resolve_language(query.locale.as_deref(), &headers);
    let (mut context, homepage) = page_context(&state, &language, "/").await;

    let media_base = &state.config.client.media_url;
    let hero = homepage.as_ref().and_then(|h| h.hero.as_ref());
    let collection = homepage.as_ref().and_then(|h| h.collection_section.as_ref());
    context.insert("hero", &HeroView::resolve(hero, media_base));
    context.insert("collection", &CollectionView::resolve(collection));

    render_page(&state, StatusCode::OK, "home.html", &context, set_cookie)
}

/// GET /blog
async fn blog(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
    headers: HeaderMap,
) -> Response {
    let (language, set_cookie) = resolve_language(query.locale.as_deref(), &headers);
    let mut params = query.into_params();
    params.locale = language.locale().to_string();

    let (mut context, _) = page_context(&state, &language, "/blog").await;
    let (articles, categories) =
        futures::join!(state.content.article_list(&params), state.content.category_list());

    let media_base = &state.config.client.media_url;
    let (cards, pagination) = match articles {
        Ok(list) => {
            let cards: Vec<ArticleCard> = list.data.iter().map(|a| ArticleCard::resolve(a, media_base)).collect();
            (cards, list.meta.pagination)
        }
        Err(e) => {
            tracing::warn!("Failed to fetch articles, showing empty blog: {}", e);
            (Vec::new(), None)
        }
    };
    let categories = categories.map(|list| list.data).unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch categories: {}", e);
        Vec::new()
    });

    context.insert("articles", &cards);
    context.insert("categories", &categories);
    context.insert("active_category", &params.category);
    context.insert("pagination", &pagination);

    render_page(&state, StatusCode::OK, "blog.html", &context, set_cookie)
}

/// GET /blog/{slug}
async fn article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let (language, set_cookie) = resolve_language(query.locale.as_deref(), &headers);
    let request_path = format!("/blog/{}", slug);
    let (mut context, _) = page_context(&state, &language, &request_path).await;

    let found = or_fallback(state.content.article(language.locale(), &slug).await, "article");

    match found {
        Some(article) => {
            let view = ArticleView::resolve(&article, &state.config.client.media_url, &state.markdown);
            context.insert("article", &view);
            render_page(&state, StatusCode::OK, "article.html", &context, set_cookie)
        }
        None => {
            context.insert("message", "Article not found");
            render_page(&state, StatusCode::NOT_FOUND, "not_found.html", &context, set_cookie)
        }
    }
}

/// GET /assets/{file}
async fn serve_asset(Path(file): Path<String>) -> Response {
    match theme::asset(&file) {
        Some(asset) => (
            [
                (header::CONTENT_TYPE, asset.content_type),
                (header::CACHE_CONTROL, "public, max-age=86400"),
            ],
            asset.body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{server, state_with};
    use crate::cms::CmsRequest;
    use crate::services::content::tests::FakeCms;
    use serde_json::json;

    fn cookie(value: &'static str) -> (axum::http::HeaderName, HeaderValue) {
        (header::COOKIE, HeaderValue::from_static(value))
    }

    #[tokio::test]
    async fn test_home_falls_back_without_cms() {
        let server = server(state_with(FakeCms::new(), None, None));

        let response = server.get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Where Football Meets Timeless Elegance"));
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(response.maybe_header("set-cookie").is_none());
    }

    #[tokio::test]
    async fn test_home_uses_cookie_locale() {
        let cms = FakeCms::new()
            .respond(
                CmsRequest::homepage("fr"),
                json!({"data": {"hero": {"title": "Le Coup D'envoi", "badge": "Edition Paris"}}}),
            )
            .respond(CmsRequest::global("fr"), json!({"data": {"siteName": "Maison Couture"}}));
        let server = server(state_with(cms, None, None));

        let (name, value) = cookie("theme=dark; locale=fr");
        let response = server.get("/").add_header(name, value).await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains(r#"<html lang="fr">"#));
        assert!(html.contains("Edition Paris"));
        assert!(html.contains("Maison"));
    }

    #[tokio::test]
    async fn test_locale_query_sets_cookie() {
        let server = server(state_with(FakeCms::new(), None, None));

        let response = server.get("/").add_query_param("locale", "it").await;

        response.assert_status_ok();
        assert!(response.text().contains(r#"<html lang="it">"#));
        assert_eq!(response.header("set-cookie"), "locale=it; Path=/; Max-Age=31536000; SameSite=Lax");
    }

    #[tokio::test]
    async fn test_unknown_locale_query_resolves_to_english() {
        let server = server(state_with(FakeCms::new(), None, None));

        let response = server.get("/").add_query_param("locale", "xx").await;

        assert!(response.text().contains(r#"<html lang="en">"#));
        assert_eq!(response.header("set-cookie"), "locale=en; Path=/; Max-Age=31536000; SameSite=Lax");
    }

    #[tokio::test]
    async fn test_blog_lists_articles_and_categories() {
        let cms = FakeCms::new()
            .respond(
                CmsRequest::articles("en", 2, 10, Some("matchday")),
                json!({
                    "data": [
                        {"id": 1, "title": "Derby Day", "slug": "derby-day", "publishedAt": "2025-03-01T10:00:00.000Z"},
                        {"id": 2, "title": "Cup Final", "slug": "cup-final"}
                    ],
                    "meta": {"pagination": {"page": 2, "pageSize": 10, "pageCount": 3, "total": 25}}
                }),
            )
            .respond(
                CmsRequest::categories(),
                json!({"data": [{"id": 3, "name": "Matchday", "slug": "matchday"}]}),
            );
        let server = server(state_with(cms, None, None));

        let response = server
            .get("/blog")
            .add_query_param("page", "2")
            .add_query_param("category", "matchday")
            .await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Derby Day"));
        assert!(html.contains("Cup Final"));
        assert!(html.contains("March 1, 2025"));
        assert!(html.contains(r#"class="active">Matchday"#));
        assert!(html.contains("2 / 3"));
    }

    #[tokio::test]
    async fn test_blog_degrades_to_empty_list() {
        let server = server(state_with(FakeCms::new(), None, None));

        let response = server.get("/blog").await;

        response.assert_status_ok();
        assert!(response.text().contains("No articles yet."));
    }

    #[tokio::test]
    async fn test_article_page() {
        let cms = FakeCms::new().respond(
            CmsRequest::article_by_slug("en", "derby-day"),
            json!({"data": [{
                "id": 1,
                "title": "Derby Day",
                "slug": "derby-day",
                "blocks": [
                    {"__component": "shared.rich-text", "body": "A *night* to remember"},
                    {"__component": "shared.quote", "title": "The captain", "body": "We play for the badge"}
                ]
            }]}),
        );
        let server = server(state_with(cms, None, None));

        let response = server.get("/blog/derby-day").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("<em>night</em>"));
        assert!(html.contains("We play for the badge"));
    }

    #[tokio::test]
    async fn test_missing_article_renders_not_found() {
        let cms = FakeCms::new().respond(CmsRequest::article_by_slug("en", "gone"), json!({"data": []}));
        let server = server(state_with(cms, None, None));

        let response = server.get("/blog/gone").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Article not found"));
    }

    #[tokio::test]
    async fn test_article_fetch_failure_renders_not_found() {
        let cms = FakeCms::new().fail(CmsRequest::article_by_slug("en", "derby-day"), 500);
        let server = server(state_with(cms, None, None));

        let response = server.get("/blog/derby-day").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_assets() {
        let server = server(state_with(FakeCms::new(), None, None));

        let response = server.get("/assets/site.css").await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/css; charset=utf-8");

        let response = server.get("/assets/hero-watch.svg").await;
        assert_eq!(response.header("content-type"), "image/svg+xml");

        server.get("/assets/missing.png").await.assert_status(StatusCode::NOT_FOUND);
    }
}
