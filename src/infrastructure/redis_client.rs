//! Shared Redis connection used by the cache, the rate limiter and the click queue.

use anyhow::{Context, Result};
use redis::{Client, aio::ConnectionManager};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

/// Number of connection attempts made at startup before giving up.
const CONNECT_ATTEMPTS: usize = 5;

/// Opens a [`ConnectionManager`] and verifies it with a PING.
///
/// Retries with exponential backoff (100 ms doubling, capped at 5 s) so a
/// Redis container that starts a little later than the service does not abort
/// startup. The returned handle reconnects on its own afterwards.
///
/// # Errors
///
/// Returns an error if the URL is invalid or every attempt fails.
pub async fn connect(redis_url: &str) -> Result<ConnectionManager> {
    let client = Client::open(redis_url).context("Invalid Redis URL")?;

    let strategy = retry_delays().map(jitter).take(CONNECT_ATTEMPTS - 1);

    let manager = Retry::spawn(strategy, || {
        let client = client.clone();
        async move {
            let attempt = async {
                let mut manager = ConnectionManager::new(client).await?;
                redis::cmd("PING").query_async::<()>(&mut manager).await?;
                Ok::<_, redis::RedisError>(manager)
            };
            attempt.await.inspect_err(|e| {
                warn!(error = %e, "Redis connection attempt failed");
            })
        }
    })
    .await
    .context("Failed to connect to Redis")?;

    info!("Connected to Redis");
    Ok(manager)
}

/// 100 ms, 200 ms, 400 ms, ... capped at 5 s. `ExponentialBackoff` raises its
/// base to the attempt number, so the base is 2 and `factor` scales it.
fn retry_delays() -> ExponentialBackoff {
    ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delays_double_from_100ms() {
        let delays: Vec<u128> = retry_delays().take(8).map(|d| d.as_millis()).collect();

        assert_eq!(delays, vec![100, 200, 400, 800, 1600, 3200, 5000, 5000]);
    }
}
