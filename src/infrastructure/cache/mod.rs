//! Caching layer for fast redirect lookups.
//!
//! Provides a [`CacheService`] trait with two implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! Write-backs use [`jittered_ttl`] so entries do not expire in lockstep.
//! Deactivated codes are held by a tombstone for [`TOMBSTONE_TTL_SECONDS`].

mod null_cache;
mod redis_cache;
mod service;
mod ttl;

pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheService, TOMBSTONE_TTL_SECONDS};
pub use ttl::{jittered_ttl, jittered_ttl_with};

#[cfg(test)]
pub use service::MockCacheService;
