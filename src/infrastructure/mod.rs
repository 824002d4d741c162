//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching, rate limiting and
//! the click queue.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`queue`] - Durable click queue on Redis Streams
//! - [`rate_limit`] - Fixed-window counters on Redis
//! - [`redis_client`] - Shared Redis connection setup

pub mod cache;
pub mod persistence;
pub mod queue;
pub mod rate_limit;
pub mod redis_client;
