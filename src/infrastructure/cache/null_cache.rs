//! No-op cache implementation for disabled caching.

use super::service::CacheService;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when caching is disabled with `CACHE_ENABLED=false`. Every lookup is a
/// miss, so each resolution goes to the persistent store.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _shortcode: &str) -> Option<String> {
        None
    }

    async fn set_url(&self, _shortcode: &str, _long_url: &str, _ttl_seconds: u64) {}

    async fn fill_url(&self, _shortcode: &str, _long_url: &str, _ttl_seconds: u64) {}

    async fn invalidate(&self, _shortcode: &str) {}

    async fn health_check(&self) -> bool {
        true
    }
}
