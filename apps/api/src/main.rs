mod board;
mod cache;
mod config;
mod db;
mod errors;
mod matching;
mod models;
mod realtime;
mod routes;
mod session;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{InMemoryMatchCache, MatchCache, RedisMatchCache};
use crate::config::{CacheBackend, Config};
use crate::db::create_pool;
use crate::matching::evaluator::ContainmentMatcher;
use crate::routes::build_router;
use crate::session::SessionRegistry;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job board match service v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (the board's backend)
    let db = create_pool(&config.database_url).await?;

    // Initialize the match cache
    let cache = build_cache(&config)?;
    info!("Match cache initialized (backend: {})", cache.backend());

    let sessions = SessionRegistry::new();
    let shutdown = CancellationToken::new();

    // Realtime invalidation from backend row changes
    let listener = config.enable_realtime.then(|| {
        realtime::spawn_listener(db.clone(), cache.clone(), sessions.clone(), shutdown.clone())
    });

    // Build app state
    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        cache,
        matcher: Arc::new(ContainmentMatcher),
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the board's front-end host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener_socket = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener_socket, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Some(handle) = listener {
        handle.await.ok();
    }
    info!("Shut down cleanly");

    Ok(())
}

/// Picks the cache backend named by `CACHE_BACKEND`.
fn build_cache(config: &Config) -> Result<Arc<dyn MatchCache>> {
    Ok(match config.cache_backend {
        CacheBackend::Redis => {
            let url = config
                .redis_url
                .clone()
                .context("REDIS_URL is required when CACHE_BACKEND=redis")?;
            let client = redis::Client::open(url)?;
            Arc::new(RedisMatchCache::new(client, config.match_cache_ttl))
        }
        CacheBackend::Memory => Arc::new(InMemoryMatchCache::new(config.match_cache_ttl)),
    })
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C, shutting down"),
        _ = shutdown.cancelled() => {}
    }
}
