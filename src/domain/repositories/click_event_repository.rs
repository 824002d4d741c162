//! Repository trait for the click event store.

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use async_trait::async_trait;

/// Persistent store for consumed click events.
///
/// Only the click consumer writes here. Any error is treated as transient by
/// the caller and leads to the delivery being requeued.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickEventRepository: Send + Sync {
    /// Stores a single click event.
    ///
    /// No deduplication is applied: storing a redelivered event twice yields
    /// two rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the store is unavailable or the
    /// write fails.
    async fn create(&self, event: &ClickEvent) -> Result<(), AppError>;
}
