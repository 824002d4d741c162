//! API route configuration.
//!
//! Bearer access tokens are enforced per handler by the
//! [`crate::application::services::AuthContext`] extractor. Per-link stats are
//! the only public endpoint.

use crate::api::handlers::{
    create_link_handler, delete_link_handler, link_stats_handler, list_links_handler,
    stats_summary_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get},
};

/// All API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST   /urls`              - Create a short link
/// - `GET    /urls`              - List the caller's active links
/// - `DELETE /urls/{shortcode}`  - Deactivate a link
/// - `GET    /stats/summary`     - Click totals across the caller's links
/// - `GET    /stats/{shortcode}` - Click stats for one link (public)
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", get(list_links_handler).post(create_link_handler))
        .route("/urls/{shortcode}", delete(delete_link_handler))
        .route("/stats/summary", get(stats_summary_handler))
        .route("/stats/{shortcode}", get(link_stats_handler))
}
