//! Redis-backed cache implementation.

use super::service::{CacheService, TOMBSTONE_TTL_SECONDS};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, warn};

/// Namespace for cached destinations: `url:<shortcode>`.
const KEY_PREFIX: &str = "url:";

/// Value left behind by [`CacheService::invalidate`]. Never a valid destination.
const TOMBSTONE: &str = "";

/// Redis cache implementation for fast URL lookups.
///
/// Shares the process-wide [`ConnectionManager`] handle created at startup.
/// All operations are fail-open: errors are logged and counted but never
/// propagated.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Wraps an established Redis connection handle.
    pub fn new(client: ConnectionManager) -> Self {
        Self { client }
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(shortcode: &str) -> String {
        format!("{}{}", KEY_PREFIX, shortcode)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, shortcode: &str) -> Option<String> {
        let key = Self::build_key(shortcode);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(url)) if url == TOMBSTONE => {
                debug!(shortcode, "Cache TOMBSTONE");
                None
            }
            Ok(Some(url)) => {
                debug!(shortcode, "Cache HIT");
                Some(url)
            }
            Ok(None) => {
                debug!(shortcode, "Cache MISS");
                None
            }
            Err(e) => {
                warn!(shortcode, error = %e, "Cache GET failed, treating as miss");
                metrics::counter!("cache_errors_total", "op" => "get").increment(1);
                None
            }
        }
    }

    async fn set_url(&self, shortcode: &str, long_url: &str, ttl_seconds: u64) {
        let key = Self::build_key(shortcode);
        let mut conn = self.client.clone();

        match conn.set_ex::<_, _, ()>(&key, long_url, ttl_seconds).await {
            Ok(()) => debug!(shortcode, ttl_seconds, "Cache SET"),
            Err(e) => {
                warn!(shortcode, error = %e, "Cache SET failed");
                metrics::counter!("cache_errors_total", "op" => "set").increment(1);
            }
        }
    }

    async fn fill_url(&self, shortcode: &str, long_url: &str, ttl_seconds: u64) {
        let key = Self::build_key(shortcode);
        let mut conn = self.client.clone();

        let written = redis::cmd("SET")
            .arg(&key)
            .arg(long_url)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async::<Option<String>>(&mut conn)
            .await;

        match written {
            Ok(Some(_)) => debug!(shortcode, ttl_seconds, "Cache FILL"),
            Ok(None) => debug!(shortcode, "Cache FILL skipped, key present"),
            Err(e) => {
                warn!(shortcode, error = %e, "Cache SET NX failed");
                metrics::counter!("cache_errors_total", "op" => "set").increment(1);
            }
        }
    }

    async fn invalidate(&self, shortcode: &str) {
        let key = Self::build_key(shortcode);
        let mut conn = self.client.clone();

        match conn
            .set_ex::<_, _, ()>(&key, TOMBSTONE, TOMBSTONE_TTL_SECONDS)
            .await
        {
            Ok(()) => debug!(shortcode, "Cache INVALIDATE"),
            Err(e) => {
                warn!(shortcode, error = %e, "Cache tombstone SET failed");
                metrics::counter!("cache_errors_total", "op" => "del").increment(1);
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
