//! PostgreSQL implementation of the click event store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickEventRepository;
use crate::error::AppError;

/// PostgreSQL repository the click consumer writes to.
pub struct PgClickEventRepository {
    pool: Arc<PgPool>,
}

impl PgClickEventRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickEventRepository for PgClickEventRepository {
    async fn create(&self, event: &ClickEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO click_events (shortcode, long_url, clicked_at, ip, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&event.shortcode)
        .bind(&event.long_url)
        .bind(event.timestamp)
        .bind(&event.ip)
        .bind(&event.user_agent)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
