//! Handlers for click analytics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::links::DataResponse;
use crate::api::dto::stats::{LinkStatsResponse, SummaryResponse};
use crate::application::services::AuthContext;
use crate::error::AppError;
use crate::state::AppState;

/// Click statistics for one shortcode.
///
/// # Endpoint
///
/// `GET /api/stats/{shortcode}` (public)
///
/// # Response
///
/// ```json
/// {
///   "status": "success",
///   "data": {
///     "shortcode": "abc1234",
///     "totalClicks": 42,
///     "clicksToday": 3,
///     "clicksThisWeek": 17,
///     "topUserAgents": [{ "userAgent": "Mozilla/5.0", "count": 30 }]
///   }
/// }
/// ```
///
/// Codes without clicks report zeros rather than 404.
pub async fn link_stats_handler(
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
) -> Result<Json<DataResponse<LinkStatsResponse>>, AppError> {
    let stats = state.stats_service.link_stats(&shortcode).await?;

    Ok(Json(DataResponse::success(LinkStatsResponse::new(
        shortcode, stats,
    ))))
}

/// Click totals across the caller's links.
///
/// # Endpoint
///
/// `GET /api/stats/summary` (Bearer token)
///
/// `totalUrls` counts the caller's links that have been clicked at least once.
pub async fn stats_summary_handler(
    auth: AuthContext,
    State(state): State<AppState>,
) -> Result<Json<DataResponse<SummaryResponse>>, AppError> {
    let summary = state.stats_service.owner_summary(&auth.user_id).await?;

    Ok(Json(DataResponse::success(summary.into())))
}
