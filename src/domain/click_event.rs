//! Click event model and its queue wire format.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used for client metadata that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// A click on a short link, produced once per successful resolution.
///
/// Created by the resolver (cache hit or miss alike), serialized onto the
/// click queue by [`crate::infrastructure::queue::ClickPublisher`] and stored by
/// the consumer. Never mutated after creation.
///
/// # Wire format
///
/// ```json
/// {
///   "shortcode": "abc1234",
///   "longUrl": "https://example.com",
///   "timestamp": "2026-10-18T09:30:00.000Z",
///   "ip": "203.0.113.7",
///   "userAgent": "Mozilla/5.0"
/// }
/// ```
///
/// The event carries no owner identity; per-account aggregation joins on the
/// link record (see [`crate::infrastructure::persistence::PgStatsRepository`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub shortcode: String,
    pub long_url: String,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub ip: String,
    pub user_agent: String,
}

/// Reasons a queue payload can never become a stored click.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEvent {
    #[error("payload is not a click event object: {0}")]
    Unparseable(String),
    #[error("click event is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("click event timestamp `{0}` is not ISO-8601")]
    InvalidTimestamp(String),
}

/// Lenient view of a payload; required fields are checked after parsing so a
/// missing field and an unparseable body can be told apart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClickEvent {
    shortcode: Option<String>,
    long_url: Option<String>,
    timestamp: Option<String>,
    ip: Option<String>,
    user_agent: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// Missing client metadata is recorded as `"unknown"`.
    pub fn new(
        shortcode: String,
        long_url: String,
        ip: Option<String>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            shortcode,
            long_url,
            timestamp: Utc::now(),
            ip: ip.unwrap_or_else(|| UNKNOWN.to_string()),
            user_agent: user_agent
                .map(|s| s.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    /// Serializes the event into the flat JSON payload put on the queue.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses and validates a queue payload.
    ///
    /// `shortcode`, `longUrl` and `timestamp` are required and must be
    /// non-empty; `ip` and `userAgent` fall back to `"unknown"`.
    pub fn from_payload(payload: &[u8]) -> Result<Self, MalformedEvent> {
        let raw: RawClickEvent = serde_json::from_slice(payload)
            .map_err(|e| MalformedEvent::Unparseable(e.to_string()))?;

        let shortcode = required(raw.shortcode, "shortcode")?;
        let long_url = required(raw.long_url, "longUrl")?;
        let timestamp = required(raw.timestamp, "timestamp")?;

        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|_| MalformedEvent::InvalidTimestamp(timestamp.clone()))?
            .with_timezone(&Utc);

        Ok(Self {
            shortcode,
            long_url,
            timestamp,
            ip: non_empty_or_unknown(raw.ip),
            user_agent: non_empty_or_unknown(raw.user_agent),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, MalformedEvent> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MalformedEvent::MissingField(field)),
    }
}

fn non_empty_or_unknown(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn serialize_iso_millis<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
