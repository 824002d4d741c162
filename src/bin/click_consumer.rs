//! Click event consumer.
//!
//! Drains the click queue into PostgreSQL. Run one or more instances next to
//! the HTTP service; every instance joins the same consumer group, so each
//! event is stored by exactly one of them (at least once across crashes).
//!
//! # Usage
//!
//! ```bash
//! # Defaults from the environment
//! cargo run --bin click-consumer
//!
//! # Override the queue and concurrency
//! cargo run --bin click-consumer -- --queue click_events --prefetch 32
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `REDIS_URL` (required): Redis connection string
//! - `CLICK_QUEUE_NAME`, `CLICK_QUEUE_PREFETCH`, `CLICK_CONSUMER_NAME`,
//!   `CLICK_QUEUE_CLAIM_IDLE_MS`, `CLICK_QUEUE_POLL_INTERVAL_MS`

use shortlink_service::domain::click_worker::run_click_worker;
use shortlink_service::infrastructure::persistence::{self, PgClickEventRepository};
use shortlink_service::infrastructure::queue::{RedisStreamConsumer, StreamConsumerOptions};
use shortlink_service::infrastructure::redis_client;
use shortlink_service::{config, server, telemetry};

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

/// Stores click events from the durable queue.
#[derive(Parser)]
#[command(name = "click-consumer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Queue (stream) name to consume
    #[arg(short, long)]
    queue: Option<String>,

    /// Maximum number of unacknowledged deliveries in flight
    #[arg(short, long)]
    prefetch: Option<usize>,

    /// Consumer name within the group; must be unique per instance
    #[arg(long)]
    consumer_name: Option<String>,

    /// Idle time after which another consumer's pending deliveries are taken over
    #[arg(long)]
    claim_idle_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = config::load_from_env()?;
    if let Some(queue) = cli.queue {
        config.click_queue_name = queue;
    }
    if let Some(prefetch) = cli.prefetch {
        config.click_queue_prefetch = prefetch;
    }
    if let Some(name) = cli.consumer_name {
        config.click_consumer_name = name;
    }
    if let Some(idle) = cli.claim_idle_ms {
        config.click_queue_claim_idle_ms = idle;
    }
    config.validate()?;

    telemetry::init(&config.log_level, &config.log_format);
    config.print_summary();

    let pool = Arc::new(persistence::connect_pool(&config).await?);
    let store = Arc::new(PgClickEventRepository::new(pool));

    let redis = redis_client::connect(&config.redis_url).await?;
    let consumer = RedisStreamConsumer::subscribe(
        redis,
        StreamConsumerOptions {
            queue_name: config.click_queue_name.clone(),
            consumer_name: config.click_consumer_name.clone(),
            claim_idle: Duration::from_millis(config.click_queue_claim_idle_ms),
            poll_interval: Duration::from_millis(config.click_queue_poll_interval_ms),
        },
    )
    .await
    .context("Failed to subscribe to click queue")?;

    tracing::info!(
        queue = %config.click_queue_name,
        consumer = %config.click_consumer_name,
        "Subscribed to click queue"
    );

    run_click_worker(
        Arc::new(consumer),
        store,
        config.click_queue_prefetch,
        server::shutdown_signal(),
    )
    .await;

    Ok(())
}
