//! DTOs for the link management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::application::services::LinkService;
use crate::domain::entities::ShortLink;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request body of `POST /api/urls`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    /// Destination; must be an absolute http(s) URL.
    #[validate(
        url(message = "longUrl must be a valid URL including http:// or https://"),
        length(max = 2048, message = "longUrl must be under 2048 characters")
    )]
    pub long_url: String,

    /// Optional custom shortcode.
    #[validate(length(min = 3, max = 20, message = "customCode must be 3-20 characters"))]
    #[validate(regex(
        path = "*CUSTOM_CODE_REGEX",
        message = "customCode can only contain letters, numbers, hyphens and underscores"
    ))]
    pub custom_code: Option<String>,
}

/// A short link as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResponse {
    pub shortcode: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}

impl UrlResponse {
    pub fn from_link(link: ShortLink, base_url: &str) -> Self {
        Self {
            short_url: LinkService::short_url(base_url, &link.shortcode),
            shortcode: link.shortcode,
            long_url: link.long_url,
            created_at: link.created_at,
        }
    }
}

/// Envelope for a single resource: `{ "status": "success", "data": ... }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// Envelope for `GET /api/urls`.
#[derive(Debug, Serialize)]
pub struct UrlListResponse {
    pub status: &'static str,
    pub count: usize,
    pub data: Vec<UrlResponse>,
}

/// Envelope for operations without a resource body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}
