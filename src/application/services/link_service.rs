//! Link creation, listing and deactivation service.

use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, jittered_ttl};
use crate::utils::code_generator::{generate_code, validate_custom_code};

/// Service behind the management API.
///
/// Owns the cache side effects of writes: new links are written to the cache
/// straight away and deactivated links are tombstoned once the record store
/// has committed.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    cache_ttl_seconds: u64,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            links,
            cache,
            cache_ttl_seconds,
        }
    }

    /// Creates a short link owned by `owner_id`.
    ///
    /// # Code Selection
    ///
    /// - If `custom_code` is provided, validates it and fails if it is taken
    /// - Otherwise generates a random 7-character code
    /// - Retries up to 10 times on collision before failing
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not http(s) or the
    /// custom code is invalid.
    /// Returns [`AppError::Conflict`] if the custom code already exists.
    pub async fn create_link(
        &self,
        owner_id: &str,
        long_url: String,
        custom_code: Option<String>,
    ) -> Result<ShortLink, AppError> {
        validate_destination(&long_url)?;

        let shortcode = match custom_code {
            Some(custom) => {
                validate_custom_code(&custom)?;

                if self.links.find_by_code(&custom).await?.is_some() {
                    return Err(AppError::conflict(
                        format!("Custom code '{}' is already taken", custom),
                        json!({ "shortcode": custom }),
                    ));
                }

                custom
            }
            None => self.generate_unique_code().await?,
        };

        let link = self
            .links
            .create(NewShortLink {
                shortcode,
                long_url,
                owner_id: Some(owner_id.to_string()),
            })
            .await?;

        self.cache
            .set_url(
                &link.shortcode,
                &link.long_url,
                jittered_ttl(self.cache_ttl_seconds),
            )
            .await;

        info!(shortcode = %link.shortcode, owner_id, "URL created");

        Ok(link)
    }

    /// Lists the active links of `owner_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_links(&self, owner_id: &str) -> Result<Vec<ShortLink>, AppError> {
        self.links.list_active_by_owner(owner_id).await
    }

    /// Deactivates a link and tombstones its cache entry.
    ///
    /// The record store update commits before the tombstone is written, so a
    /// resolve that misses the cache afterwards always sees the inactive
    /// record, and a write-back from a lookup that started earlier is refused.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code was never issued
    /// - [`AppError::Forbidden`] if the link belongs to someone else
    /// - [`AppError::Gone`] if the link is already inactive
    pub async fn delete_link(&self, owner_id: &str, shortcode: &str) -> Result<(), AppError> {
        let link = self
            .links
            .find_by_code(shortcode)
            .await?
            .ok_or_else(|| {
                AppError::not_found("URL not found", json!({ "shortcode": shortcode }))
            })?;

        if !link.is_owned_by(owner_id) {
            return Err(AppError::forbidden(
                "You do not own this URL",
                json!({ "shortcode": shortcode }),
            ));
        }

        if !link.is_active || !self.links.deactivate(shortcode).await? {
            return Err(AppError::gone(
                "URL is already deleted",
                json!({ "shortcode": shortcode }),
            ));
        }

        self.cache.invalidate(shortcode).await;

        info!(shortcode, owner_id, "URL deleted");

        Ok(())
    }

    /// Constructs the public short URL for a code.
    pub fn short_url(base_url: &str, shortcode: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), shortcode)
    }

    /// Generates a unique short code with collision retry.
    ///
    /// Attempts up to 10 times before failing.
    async fn generate_unique_code(&self) -> Result<String, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for _ in 0..MAX_ATTEMPTS {
            let code = generate_code();

            if self.links.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}

/// Accepts absolute http(s) URLs only.
fn validate_destination(long_url: &str) -> Result<(), AppError> {
    let parsed = url::Url::parse(long_url).map_err(|e| {
        AppError::bad_request(
            "longUrl must be a valid URL including http:// or https://",
            json!({ "reason": e.to_string() }),
        )
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        scheme => Err(AppError::bad_request(
            "longUrl must be a valid URL including http:// or https://",
            json!({ "scheme": scheme }),
        )),
    }
}
