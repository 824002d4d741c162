//! Atomic counter store used by the rate limiter.

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

/// The counter store could not be reached or rejected the command.
#[derive(Debug, thiserror::Error)]
#[error("counter store unavailable: {0}")]
pub struct CounterStoreError(pub String);

impl From<redis::RedisError> for CounterStoreError {
    fn from(e: redis::RedisError) -> Self {
        Self(e.to_string())
    }
}

/// Shared counters with per-key expiry.
///
/// All cross-instance coordination of the rate limiter rests on `incr` being
/// atomic in the backing store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments `key` and returns the new value (1 for a new key).
    async fn incr(&self, key: &str) -> Result<u64, CounterStoreError>;

    /// Sets the expiry of `key` in seconds.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), CounterStoreError>;

    /// Remaining TTL in seconds: `-1` when the key has no expiry, `-2` when it
    /// does not exist.
    async fn ttl(&self, key: &str) -> Result<i64, CounterStoreError>;
}

/// Redis implementation using `INCR`, `EXPIRE` and `TTL`.
pub struct RedisCounterStore {
    client: ConnectionManager,
}

impl RedisCounterStore {
    /// Wraps an established Redis connection handle.
    pub fn new(client: ConnectionManager) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, CounterStoreError> {
        let mut conn = self.client.clone();
        let count: u64 = conn.incr(key, 1u64).await?;
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), CounterStoreError> {
        let mut conn = self.client.clone();
        let _: bool = conn.expire(key, ttl_seconds as i64).await?;
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<i64, CounterStoreError> {
        let mut conn = self.client.clone();
        let ttl: i64 = conn.ttl(key).await?;
        Ok(ttl)
    }
}
