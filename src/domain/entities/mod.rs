//! Core domain entities.
//!
//! - [`ShortLink`] - A shortcode → destination mapping
//! - [`NewShortLink`] - Input for creating a short link
//!
//! Click telemetry lives in [`crate::domain::click_event`] because it is a
//! message travelling through the queue rather than a stored record owned by
//! this service.

pub mod short_link;

pub use short_link::{NewShortLink, ShortLink};
