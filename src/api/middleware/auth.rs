//! Bearer token authentication.
//!
//! The caller's identity is an explicit [`AuthContext`] argument of every
//! protected handler rather than something written onto the request.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::application::services::AuthContext;
use crate::{error::AppError, state::AppState};

/// Authenticates requests using Bearer tokens from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Rejects with `401 Unauthorized` (and `WWW-Authenticate: Bearer`) if:
/// - Authorization header is missing or not a Bearer credential
/// - Token signature is invalid or the token has expired
///
/// # Example
///
/// ```rust,ignore
/// async fn list_links_handler(auth: AuthContext, State(st): State<AppState>) { ... }
/// ```
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthBearer(token) = AuthBearer::from_request_parts(parts, &())
            .await
            .map_err(|_| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "No token provided"}),
                )
            })?;

        state.auth_service.authenticate(&token)
    }
}

/// Identity behind a valid bearer token, if any.
///
/// Used where an identity is welcome but not required, such as choosing the
/// API rate limit key. Invalid tokens yield `None`; rejecting them is left to
/// the [`AuthContext`] extractor.
pub fn optional_identity(headers: &HeaderMap, state: &AppState) -> Option<AuthContext> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    if token.is_empty() {
        return None;
    }

    state.auth_service.authenticate(token).ok()
}
