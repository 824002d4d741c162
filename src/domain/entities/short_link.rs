//! Short link entity representing a shortcode → destination mapping.

use chrono::{DateTime, Utc};

/// A short link record as stored in the persistent record store.
///
/// The shortcode is the immutable key and is never reassigned. Deactivation
/// (`is_active = false`) is the only lifecycle transition and it is
/// irreversible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub shortcode: String,
    pub long_url: String,
    pub is_active: bool,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        shortcode: String,
        long_url: String,
        is_active: bool,
        owner_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            shortcode,
            long_url,
            is_active,
            owner_id,
            created_at,
        }
    }

    /// Returns true if the link belongs to the given identity.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub shortcode: String,
    pub long_url: String,
    pub owner_id: Option<String>,
}
