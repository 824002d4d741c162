//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{shortcode}` - Short link redirect (public, limited per client address)
//! - `GET  /`            - Empty code, answered with 204 under the same limit
//! - `GET  /health`      - Health check: database, cache, click queue (public)
//! - `/api/*`            - Management and stats API (limited per identity)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Fixed window on shared Redis counters
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Client addresses are taken from `ConnectInfo<SocketAddr>`, so serve the
/// router with `into_make_service_with_connect_info`. When
/// [`AppState::behind_proxy`] is set, `X-Forwarded-For` / `X-Real-IP` win.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and middleware without path normalization.
pub fn router(state: AppState) -> Router {
    let api_router = api::routes::api_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), rate_limit::api_layer),
    );

    let redirect_router = Router::new()
        .route("/", get(redirect_handler))
        .route("/{shortcode}", get(redirect_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::redirect_layer,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .merge(redirect_router)
        .with_state(state)
        .layer(tracing::layer())
}
