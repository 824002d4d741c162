//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Short link records
//! - [`PgClickEventRepository`] - Click events written by the consumer
//! - [`PgStatsRepository`] - Click analytics read back from those events
//!
//! [`connect_pool`] builds the shared [`sqlx::PgPool`] both binaries use.

pub mod pg_click_event_repository;
pub mod pg_link_repository;
pub mod pg_stats_repository;
pub mod pool;

pub use pg_click_event_repository::PgClickEventRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_stats_repository::PgStatsRepository;
pub use pool::connect_pool;
