//! Distributed rate limiting.
//!
//! - [`CounterStore`] - Atomic counters with expiry ([`RedisCounterStore`] in production)
//! - [`FixedWindowLimiter`] - Fixed-window policy evaluated per scope

mod counter_store;
mod limiter;

pub use counter_store::{CounterStore, CounterStoreError, RedisCounterStore};
pub use limiter::{FixedWindowLimiter, RateLimitDecision, RateLimitInfo, RateLimitPolicy};

#[cfg(test)]
pub use counter_store::MockCounterStore;
