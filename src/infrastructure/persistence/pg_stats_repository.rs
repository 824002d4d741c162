//! PostgreSQL implementation of click analytics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{
    LinkClickStats, OwnerClickSummary, ShortcodeCount, StatsRepository, UserAgentCount,
};
use crate::error::AppError;

/// PostgreSQL repository reading the `click_events` table the consumer fills.
///
/// Per-link queries use `idx_click_events_shortcode_time`. Owner summaries
/// join `short_links` to find the owner, since click events carry none.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn link_stats(
        &self,
        shortcode: &str,
        last_day: DateTime<Utc>,
        last_week: DateTime<Utc>,
        top: i64,
    ) -> Result<LinkClickStats, AppError> {
        let counts = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE clicked_at >= $2),
                COUNT(*) FILTER (WHERE clicked_at >= $3)
            FROM click_events
            WHERE shortcode = $1
            "#,
        )
        .bind(shortcode)
        .bind(last_day)
        .bind(last_week)
        .fetch_one(self.pool.as_ref());

        let agents = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT user_agent, COUNT(*) AS clicks
            FROM click_events
            WHERE shortcode = $1
            GROUP BY user_agent
            ORDER BY clicks DESC, user_agent
            LIMIT $2
            "#,
        )
        .bind(shortcode)
        .bind(top)
        .fetch_all(self.pool.as_ref());

        let ((total, day, week), agents) = tokio::try_join!(counts, agents)?;

        Ok(LinkClickStats {
            total_clicks: total,
            clicks_last_day: day,
            clicks_last_week: week,
            top_user_agents: agents
                .into_iter()
                .map(|(user_agent, count)| UserAgentCount { user_agent, count })
                .collect(),
        })
    }

    async fn owner_summary(
        &self,
        owner_id: &str,
        last_day: DateTime<Utc>,
        top: i64,
    ) -> Result<OwnerClickSummary, AppError> {
        let counts = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(DISTINCT ce.shortcode),
                COUNT(*) FILTER (WHERE ce.clicked_at >= $2)
            FROM click_events ce
            JOIN short_links sl ON sl.shortcode = ce.shortcode
            WHERE sl.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .bind(last_day)
        .fetch_one(self.pool.as_ref());

        let ranking = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT ce.shortcode, COUNT(*) AS clicks
            FROM click_events ce
            JOIN short_links sl ON sl.shortcode = ce.shortcode
            WHERE sl.owner_id = $1
            GROUP BY ce.shortcode
            ORDER BY clicks DESC, ce.shortcode
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(top)
        .fetch_all(self.pool.as_ref());

        let ((total, clicked, day), ranking) = tokio::try_join!(counts, ranking)?;

        Ok(OwnerClickSummary {
            total_clicks: total,
            clicked_links: clicked,
            clicks_last_day: day,
            top_shortcodes: ranking
                .into_iter()
                .map(|(shortcode, count)| ShortcodeCount { shortcode, count })
                .collect(),
        })
    }
}
