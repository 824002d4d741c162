//! Fixed-window rate limiter over a shared atomic counter.
//!
//! Every request increments `<scope>:<identifier>`. The first increment of a
//! window sets the key's expiry to the window length; later increments never
//! touch it, so the window cannot be extended by continued traffic. Once the
//! key expires the next request starts a fresh window.

use std::sync::Arc;
use tracing::{debug, warn};

use super::counter_store::{CounterStore, CounterStoreError};

/// Limits applied to one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Key namespace, e.g. `rl:ip` or `rl:user`.
    pub scope: String,
    /// Requests allowed per window.
    pub max_requests: u64,
    /// Window length in seconds.
    pub window_seconds: u64,
}

impl RateLimitPolicy {
    pub fn new(scope: impl Into<String>, max_requests: u64, window_seconds: u64) -> Self {
        Self {
            scope: scope.into(),
            max_requests,
            window_seconds,
        }
    }
}

/// Quota metadata reported to clients via `X-RateLimit-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    /// Seconds until the current window resets.
    pub reset_after: u64,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allow(RateLimitInfo),
    Reject { retry_after: u64, info: RateLimitInfo },
    /// The counter store failed; the request is let through unmetered.
    FailOpen,
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, RateLimitDecision::Reject { .. })
    }
}

/// Fixed-window limiter for a single scope.
///
/// Holds no in-process state: every instance of the service sharing the same
/// counter store enforces one combined quota per identifier.
pub struct FixedWindowLimiter {
    store: Arc<dyn CounterStore>,
    policy: RateLimitPolicy,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn CounterStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    fn key(&self, identifier: &str) -> String {
        format!("{}:{}", self.policy.scope, identifier)
    }

    /// Counts one request for `identifier` and decides whether it may proceed.
    ///
    /// Never fails: an unreachable counter store yields
    /// [`RateLimitDecision::FailOpen`].
    pub async fn check(&self, identifier: &str) -> RateLimitDecision {
        match self.try_check(identifier).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    scope = %self.policy.scope,
                    error = %e,
                    "Rate limiter unavailable, failing open"
                );
                metrics::counter!(
                    "rate_limit_fail_open_total",
                    "scope" => self.policy.scope.clone()
                )
                .increment(1);
                RateLimitDecision::FailOpen
            }
        }
    }

    async fn try_check(&self, identifier: &str) -> Result<RateLimitDecision, CounterStoreError> {
        let key = self.key(identifier);
        let window = self.policy.window_seconds;

        let count = self.store.incr(&key).await?;
        if count == 1 {
            self.store.expire(&key, window).await?;
        }

        let mut ttl = self.store.ttl(&key).await?;
        if ttl == -1 {
            // An EXPIRE lost after INCR would otherwise pin this counter forever.
            self.store.expire(&key, window).await?;
            ttl = window as i64;
        }

        let reset_after = if ttl < 0 { window } else { (ttl as u64).min(window) };
        let info = RateLimitInfo {
            limit: self.policy.max_requests,
            remaining: self.policy.max_requests.saturating_sub(count),
            reset_after,
        };

        if count > self.policy.max_requests {
            debug!(key, count, limit = self.policy.max_requests, ttl, "Rate limit exceeded");
            metrics::counter!("rate_limit_rejected_total", "scope" => self.policy.scope.clone())
                .increment(1);
            return Ok(RateLimitDecision::Reject {
                retry_after: reset_after.max(1),
                info,
            });
        }

        Ok(RateLimitDecision::Allow(info))
    }
}
