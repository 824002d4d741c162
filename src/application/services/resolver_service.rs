//! Cache-aside short link resolution.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, jittered_ttl};
use crate::infrastructure::queue::ClickPublisher;
use crate::utils::client_info::ClientInfo;

/// Paths that reach the redirect route but are never short codes.
const IGNORED_CODES: &[&str] = &["favicon.ico"];

/// Result of resolving a shortcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Redirect the client to this destination.
    Redirect(String),
    /// Request for a reserved path; answer with no content.
    Ignored,
}

/// Resolves shortcodes to destinations on the redirect hot path.
///
/// # Lookup order
///
/// 1. Cache. A hit returns immediately; the record store is not touched.
/// 2. Record store on a miss. Unknown codes are `NotFound`, deactivated ones
///    `Gone`.
/// 3. Write-back of an active destination with a jittered TTL.
///
/// Every successful resolution, hit or miss, emits one [`ClickEvent`] on a
/// detached task. Cache failures behave like misses; only a record store
/// failure fails the request.
///
/// A cache hit does not re-check the active flag. Deactivation replaces the
/// cache entry with a tombstone after the store commits (see
/// [`super::LinkService::delete_link`]), and write-backs never overwrite an
/// existing key. A resolve that read the record before the commit still
/// answers with the old destination once, but cannot cache it.
pub struct ResolverService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    publisher: Arc<ClickPublisher>,
    cache_ttl_seconds: u64,
}

impl ResolverService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        publisher: Arc<ClickPublisher>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            links,
            cache,
            publisher,
            cache_ttl_seconds,
        }
    }

    /// Resolves `shortcode` for the client described by `client`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code was never issued
    /// - [`AppError::Gone`] if the link has been deactivated
    /// - [`AppError::Internal`] if the record store fails after a cache miss
    pub async fn resolve(
        &self,
        shortcode: &str,
        client: &ClientInfo,
    ) -> Result<Resolution, AppError> {
        if shortcode.is_empty() || IGNORED_CODES.contains(&shortcode) {
            return Ok(Resolution::Ignored);
        }

        let long_url = match self.cache.get_url(shortcode).await {
            Some(url) => {
                info!(shortcode, "Redirect via cache");
                url
            }
            None => {
                let url = self.lookup(shortcode).await?;
                info!(shortcode, "Redirect via database");
                url
            }
        };

        let event = ClickEvent::new(
            shortcode.to_string(),
            long_url.clone(),
            client.ip.clone(),
            client.user_agent.as_deref(),
        );
        self.publisher.spawn_publish(event);

        Ok(Resolution::Redirect(long_url))
    }

    async fn lookup(&self, shortcode: &str) -> Result<String, AppError> {
        let link = self
            .links
            .find_by_code(shortcode)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short URL not found", json!({ "shortcode": shortcode }))
            })?;

        if !link.is_active {
            return Err(AppError::gone(
                "Short URL has been deleted",
                json!({ "shortcode": shortcode }),
            ));
        }

        let ttl = jittered_ttl(self.cache_ttl_seconds);
        self.cache.fill_url(shortcode, &link.long_url, ttl).await;
        debug!(shortcode, ttl, "Destination cached");

        Ok(link.long_url)
    }
}
