//! Fixed-window rate limiting middleware.
//!
//! Every limited response carries the quota headers:
//!
//! | Header                  | Value                                   |
//! |-------------------------|-----------------------------------------|
//! | `X-RateLimit-Limit`     | requests allowed per window             |
//! | `X-RateLimit-Remaining` | requests left in the current window     |
//! | `X-RateLimit-Reset`     | Unix time (seconds) the window resets   |
//!
//! Rejected requests get `429 Too Many Requests` with `Retry-After`. When the
//! counter store is down requests pass through without quota headers.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::warn;

use super::auth::optional_identity;
use crate::error::AppError;
use crate::infrastructure::rate_limit::{FixedWindowLimiter, RateLimitDecision, RateLimitInfo};
use crate::state::AppState;
use crate::utils::client_info::ClientInfo;

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Limits the public redirect route per client address.
///
/// # Example
///
/// ```rust,ignore
/// let redirect = Router::new()
///     .route("/{shortcode}", get(redirect_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::redirect_layer));
/// ```
pub async fn redirect_layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let client = client_of(&req, st.behind_proxy);
    enforce(&st.redirect_limiter, client.ip_or_unknown(), req, next).await
}

/// Limits the management API per authenticated identity, falling back to the
/// client address for anonymous or invalid credentials.
pub async fn api_layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let identifier = match optional_identity(req.headers(), &st) {
        Some(ctx) => ctx.user_id,
        None => client_of(&req, st.behind_proxy).ip_or_unknown().to_string(),
    };

    enforce(&st.api_limiter, &identifier, req, next).await
}

fn client_of(req: &Request, behind_proxy: bool) -> ClientInfo {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    ClientInfo::from_headers(req.headers(), peer, behind_proxy)
}

async fn enforce(
    limiter: &FixedWindowLimiter,
    identifier: &str,
    req: Request,
    next: Next,
) -> Response {
    match limiter.check(identifier).await {
        RateLimitDecision::Allow(info) => {
            let mut response = next.run(req).await;
            apply_headers(response.headers_mut(), &info);
            response
        }
        RateLimitDecision::Reject { retry_after, info } => {
            warn!(
                scope = %limiter.policy().scope,
                identifier,
                limit = info.limit,
                retry_after,
                "Rate limit exceeded"
            );

            let mut response = AppError::rate_limited(
                "Too many requests, please slow down",
                retry_after,
                json!({ "limit": info.limit, "retry_after": retry_after }),
            )
            .into_response();
            apply_headers(response.headers_mut(), &info);
            response
        }
        RateLimitDecision::FailOpen => next.run(req).await,
    }
}

fn apply_headers(headers: &mut HeaderMap, info: &RateLimitInfo) {
    let reset_at = chrono::Utc::now().timestamp().max(0) as u64 + info.reset_after;

    headers.insert(LIMIT_HEADER, HeaderValue::from(info.limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(info.remaining));
    headers.insert(RESET_HEADER, HeaderValue::from(reset_at));
}
