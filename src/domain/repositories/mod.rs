//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link records (lookup, create, deactivate)
//! - [`ClickEventRepository`] - Click event store written by the consumer
//! - [`StatsRepository`] - Click analytics read from the same store

pub mod click_event_repository;
pub mod link_repository;
pub mod stats_repository;

pub use click_event_repository::ClickEventRepository;
pub use link_repository::LinkRepository;
pub use stats_repository::{
    LinkClickStats, OwnerClickSummary, ShortcodeCount, StatsRepository, UserAgentCount,
};

#[cfg(test)]
pub use click_event_repository::MockClickEventRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
