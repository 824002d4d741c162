//! Handlers for link management endpoints (create, list, delete).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{
    CreateUrlRequest, DataResponse, MessageResponse, UrlListResponse, UrlResponse,
};
use crate::application::services::AuthContext;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for the authenticated caller.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// # Request Body
///
/// ```json
/// { "longUrl": "https://example.com", "customCode": "my-promo" }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "status": "success",
///   "data": {
///     "shortcode": "my-promo",
///     "shortUrl": "http://localhost:3002/my-promo",
///     "longUrl": "https://example.com",
///     "createdAt": "2026-10-18T09:30:00Z"
///   }
/// }
/// ```
///
/// # Errors
///
/// - 400 if validation fails
/// - 409 if `customCode` is taken
pub async fn create_link_handler(
    auth: AuthContext,
    State(state): State<AppState>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<DataResponse<UrlResponse>>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(&auth.user_id, payload.long_url, payload.custom_code)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::success(UrlResponse::from_link(
            link,
            &state.base_url,
        ))),
    ))
}

/// Lists the caller's active links, newest first.
///
/// # Endpoint
///
/// `GET /api/urls`
pub async fn list_links_handler(
    auth: AuthContext,
    State(state): State<AppState>,
) -> Result<Json<UrlListResponse>, AppError> {
    let links = state.link_service.list_links(&auth.user_id).await?;

    let data: Vec<UrlResponse> = links
        .into_iter()
        .map(|link| UrlResponse::from_link(link, &state.base_url))
        .collect();

    Ok(Json(UrlListResponse {
        status: "success",
        count: data.len(),
        data,
    }))
}

/// Deactivates one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /api/urls/{shortcode}`
///
/// # Errors
///
/// - 404 if the shortcode does not exist
/// - 403 if the link belongs to someone else
/// - 410 if the link is already inactive
pub async fn delete_link_handler(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .link_service
        .delete_link(&auth.user_id, &shortcode)
        .await?;

    Ok(Json(MessageResponse {
        status: "success",
        message: "URL deleted successfully".to_string(),
    }))
}
