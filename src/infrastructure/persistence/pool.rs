//! PostgreSQL connection pool setup.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::config::{Config, mask_connection_string};

const CONNECT_ATTEMPTS: usize = 5;

/// Builds the pool from the `DB_*` settings and waits for the first connection.
///
/// Startup retries with exponential backoff (200 ms doubling, capped at 5 s)
/// so the service tolerates a database that comes up after it does.
///
/// # Errors
///
/// Returns an error if every attempt fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = retry_delays().map(jitter).take(CONNECT_ATTEMPTS - 1);

    let pool = Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options
                .connect(&config.database_url)
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "Database connection attempt failed"))
        }
    })
    .await
    .with_context(|| {
        format!(
            "Failed to connect to database at {}",
            mask_connection_string(&config.database_url)
        )
    })?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to database"
    );
    Ok(pool)
}

fn retry_delays() -> ExponentialBackoff {
    ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(5))
}
