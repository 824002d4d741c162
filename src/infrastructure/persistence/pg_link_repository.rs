//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for short link records.
///
/// Uses bound parameters for every query; rows map onto [`ShortLink`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShortLinkRow {
    shortcode: String,
    long_url: String,
    is_active: bool,
    owner_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(r: ShortLinkRow) -> Self {
        ShortLink::new(r.shortcode, r.long_url, r.is_active, r.owner_id, r.created_at)
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_code(&self, shortcode: &str) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            SELECT shortcode, long_url, is_active, owner_id, created_at
            FROM short_links
            WHERE shortcode = $1
            "#,
        )
        .bind(shortcode)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            INSERT INTO short_links (shortcode, long_url, owner_id)
            VALUES ($1, $2, $3)
            RETURNING shortcode, long_url, is_active, owner_id, created_at
            "#,
        )
        .bind(&new_link.shortcode)
        .bind(&new_link.long_url)
        .bind(&new_link.owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_active_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>, AppError> {
        let rows = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            SELECT shortcode, long_url, is_active, owner_id, created_at
            FROM short_links
            WHERE owner_id = $1 AND is_active
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ShortLink::from).collect())
    }

    async fn deactivate(&self, shortcode: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET is_active = FALSE
            WHERE shortcode = $1 AND is_active
            "#,
        )
        .bind(shortcode)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
