//! Cache service trait.

use async_trait::async_trait;

/// Trait for caching shortcode → destination mappings.
///
/// Every operation is fail-open and has no error channel: an unreachable cache
/// behaves exactly like an empty one. Implementations log and count their own
/// failures.
///
/// # Write-backs and tombstones
///
/// [`CacheService::invalidate`] leaves a short-lived tombstone in place of the
/// entry. [`CacheService::fill_url`] only writes when the key is absent, so a
/// resolve that read the record before a deactivation committed cannot put the
/// old destination back. Tombstones read as misses.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the destination for a shortcode.
    ///
    /// Returns `None` on a miss, on a tombstone and on any backend failure.
    async fn get_url(&self, shortcode: &str) -> Option<String>;

    /// Stores a destination with an explicit TTL in seconds, replacing
    /// whatever is there.
    ///
    /// Callers pass an already jittered TTL (see [`super::jittered_ttl`]).
    /// Failures are swallowed.
    async fn set_url(&self, shortcode: &str, long_url: &str, ttl_seconds: u64);

    /// Stores a destination only if nothing, tombstones included, is cached
    /// under `shortcode`.
    ///
    /// Used for read-path write-backs. Failures are swallowed.
    async fn fill_url(&self, shortcode: &str, long_url: &str, ttl_seconds: u64);

    /// Replaces a cached mapping with a tombstone that lives for
    /// [`TOMBSTONE_TTL_SECONDS`].
    ///
    /// Used after a link is deactivated. Failures are swallowed.
    async fn invalidate(&self, shortcode: &str);

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}

/// How long a tombstone blocks write-backs. Must outlast a record store lookup.
pub const TOMBSTONE_TTL_SECONDS: u64 = 60;
