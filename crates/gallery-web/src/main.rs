use std::sync::Arc;

use gallery_common::markdown::MarkdownRenderer;
use gallery_common::redis::RedisCache;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gallery_web::cache::GalleryCache;
use gallery_web::catalog::CatalogLoader;
use gallery_web::config::Config;
use gallery_web::preview::PreviewService;
use gallery_web::rate_limit::RateLimiter;
use gallery_web::server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting gallery-web");

    let config = Config::from_env()?;
    info!(
        root = %config.root.display(),
        page_size = config.page_size,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "config loaded"
    );

    let redis = RedisCache::new(config.redis_url.as_deref());
    if redis.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, running without session and render caches");
    }
    let cache = Arc::new(GalleryCache::new(redis, config.cache_ttl));

    let loader = CatalogLoader::new(config.manifest_path(), cache.clone());
    let catalog = match loader.load().await {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            warn!(error = %e, "manifest not loaded at startup, will retry on first request");
            None
        }
    };

    info!(
        api_url = %config.render.api_url,
        remote_enabled = config.render.remote_enabled,
        timeout_ms = config.render.timeout.as_millis(),
        "markdown renderer configured"
    );
    let renderer = MarkdownRenderer::new(config.render.clone())?;
    let limiter = RateLimiter::from_env();
    let previews = PreviewService::new(renderer, limiter, cache);

    let state = Arc::new(AppState::new(&config, catalog, loader, previews));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "gallery-web listening");
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })?;

    info!("gallery-web shut down");
    Ok(())
}
