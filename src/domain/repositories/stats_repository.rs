//! Repository trait for click analytics over stored click events.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Click counts for a single shortcode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClickStats {
    pub total_clicks: i64,
    /// Clicks at or after the `last_day` cutoff.
    pub clicks_last_day: i64,
    /// Clicks at or after the `last_week` cutoff.
    pub clicks_last_week: i64,
    pub top_user_agents: Vec<UserAgentCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentCount {
    pub user_agent: String,
    pub count: i64,
}

/// Click counts across every link of one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerClickSummary {
    pub total_clicks: i64,
    /// Distinct shortcodes with at least one click.
    pub clicked_links: i64,
    pub clicks_last_day: i64,
    pub top_shortcodes: Vec<ShortcodeCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcodeCount {
    pub shortcode: String,
    pub count: i64,
}

/// Read side of the click event store.
///
/// Cutoffs are passed in by the caller so the time windows stay out of SQL.
/// Rankings order by count descending, ties broken alphabetically.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStatsRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Aggregates the clicks recorded for `shortcode`.
    ///
    /// A code without clicks, issued or not, yields all zeros.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn link_stats(
        &self,
        shortcode: &str,
        last_day: DateTime<Utc>,
        last_week: DateTime<Utc>,
        top: i64,
    ) -> Result<LinkClickStats, AppError>;

    /// Aggregates the clicks recorded for every link owned by `owner_id`,
    /// active or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn owner_summary(
        &self,
        owner_id: &str,
        last_day: DateTime<Utc>,
        top: i64,
    ) -> Result<OwnerClickSummary, AppError>;
}
