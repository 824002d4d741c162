//! HTTP server initialization and runtime setup.
//!
//! Handles database and Redis connections, cache selection, and the Axum
//! server lifecycle. The click consumer runs as its own binary.

use crate::config::Config;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{self, PgLinkRepository, PgStatsRepository};
use crate::infrastructure::queue::RedisStreamQueue;
use crate::infrastructure::rate_limit::RedisCounterStore;
use crate::infrastructure::redis_client;
use crate::routes::app_router;
use crate::state::{AppState, StateSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Shared Redis connection for cache, rate limit counters and click queue
/// - Axum HTTP server with graceful shutdown on Ctrl-C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database or Redis connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = Arc::new(persistence::connect_pool(&config).await?);
    sqlx::migrate!("./migrations")
        .run(pool.as_ref())
        .await
        .context("Failed to run migrations")?;

    let redis = redis_client::connect(&config.redis_url).await?;

    let cache: Arc<dyn CacheService> = if config.cache_enabled {
        tracing::info!("Cache enabled (Redis)");
        Arc::new(RedisCache::new(redis.clone()))
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let state = AppState::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgStatsRepository::new(pool)),
        cache,
        Arc::new(RedisCounterStore::new(redis.clone())),
        Arc::new(RedisStreamQueue::new(redis, config.click_queue_name.clone())),
        &StateSettings::from_config(&config),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
