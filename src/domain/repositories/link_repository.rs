//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the persistent short link records.
///
/// This store is the source of truth for resolution. Unlike the cache, its
/// errors are propagated: once the cache has missed there is no fallback.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by its shortcode, active or not.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortLink))` if a record exists (check `is_active`)
    /// - `Ok(None)` if the shortcode was never issued
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&self, shortcode: &str) -> Result<Option<ShortLink>, AppError>;

    /// Creates a new, active short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the shortcode already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Lists active links belonging to `owner_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_active_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>, AppError>;

    /// Marks a link inactive.
    ///
    /// Returns `Ok(true)` if an active link was deactivated by this call,
    /// `Ok(false)` if it did not exist or was already inactive. The change is
    /// committed when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn deactivate(&self, shortcode: &str) -> Result<bool, AppError>;

    /// Checks that the record store answers a trivial query.
    async fn health_check(&self) -> bool;
}
