//! Kick Off Couture - storefront edge server

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kickoff::{
    api::{self, AppState, RequestStats},
    cache::create_cache,
    cms::HttpCmsClient,
    config::Config,
    services::{CdnPurger, ContentService, MarkdownRenderer, RevalidationService, VercelPurger},
    theme::ThemeEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kickoff=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Kick Off Couture storefront...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded, CMS at {}", config.cms.url);

    // Upstream CMS and response cache
    let cms = Arc::new(HttpCmsClient::new(&config.cms)?);
    let cache = create_cache(&config.cache);
    match &cache {
        Some(_) => tracing::info!("Response cache enabled ({}s TTL)", config.cache.ttl_seconds),
        None => tracing::info!("Response cache disabled"),
    }
    let content = Arc::new(ContentService::new(cms, cache));

    // CDN purging is optional: without a token cached pages expire naturally
    let purger = VercelPurger::from_config(&config.cdn)?.map(|p| Arc::new(p) as Arc<dyn CdnPurger>);
    let revalidation = Arc::new(RevalidationService::new(
        content.clone(),
        purger,
        config.revalidate.secret.clone(),
        config.revalidate.public_host.clone(),
    ));
    if !revalidation.purging_enabled() {
        tracing::warn!("CDN token not configured, revalidation will rely on cache expiry");
    }
    if config.revalidate.secret.as_deref().map_or(true, str::is_empty) {
        tracing::warn!("Webhook secret not configured, every revalidation request will be rejected");
    }

    // Pages
    let theme = ThemeEngine::new(config.site.templates_path.as_deref())?;
    let markdown = MarkdownRenderer::with_media_base(config.client.media_url.clone());

    let config = Arc::new(config);
    let state = AppState {
        config: config.clone(),
        content,
        revalidation,
        theme: Arc::new(theme),
        markdown: Arc::new(markdown),
        request_stats: Arc::new(RequestStats::new()),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
