//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::application::services::Resolution;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_info::ClientInfo;

/// Redirects a shortcode to its destination.
///
/// # Endpoint
///
/// `GET /{shortcode}`, and `GET /` for the empty code
///
/// # Responses
///
/// - **302 Found** with `Location` on success
/// - **204 No Content** for the empty code and for browser requests such as
///   `/favicon.ico`
/// - **404 Not Found** if the shortcode was never issued
/// - **410 Gone** if the link has been deactivated
/// - **429 Too Many Requests** from the rate limit layer in front of it
///
/// Resolution itself lives in [`crate::application::services::ResolverService`];
/// the click event is published without delaying the response.
pub async fn redirect_handler(
    shortcode: Option<Path<String>>,
    State(state): State<AppState>,
    client: ClientInfo,
) -> Result<Response, AppError> {
    let shortcode = shortcode.map(|Path(code)| code).unwrap_or_default();

    match state.resolver.resolve(&shortcode, &client).await? {
        Resolution::Redirect(long_url) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, long_url)]).into_response())
        }
        Resolution::Ignored => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
