//! Click analytics service.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::domain::repositories::{LinkClickStats, OwnerClickSummary, StatsRepository};
use crate::error::AppError;

/// Length of the ranked lists in both reports.
pub const TOP_N: i64 = 5;

/// Read-only analytics over the click events the consumer stores.
///
/// "Today" and "this week" are rolling windows of 24 hours and 7 days ending
/// now, not calendar boundaries.
pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
}

impl StatsService {
    /// Creates a new statistics service.
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self { repository }
    }

    /// Click counts and top user agents for one shortcode.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn link_stats(&self, shortcode: &str) -> Result<LinkClickStats, AppError> {
        let now = Utc::now();
        let stats = self
            .repository
            .link_stats(
                shortcode,
                now - Duration::hours(24),
                now - Duration::days(7),
                TOP_N,
            )
            .await?;

        debug!(shortcode, total_clicks = stats.total_clicks, "Stats fetched");
        Ok(stats)
    }

    /// Click counts and top shortcodes across the caller's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn owner_summary(&self, owner_id: &str) -> Result<OwnerClickSummary, AppError> {
        let since = Utc::now() - Duration::hours(24);
        let summary = self
            .repository
            .owner_summary(owner_id, since, TOP_N)
            .await?;

        debug!(owner_id, total_clicks = summary.total_clicks, "Summary fetched");
        Ok(summary)
    }
}
