//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1`
/// 2. **Cache**: Redis PING (always ok when caching is disabled)
/// 3. **Click Queue**: PING on the broker connection
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "cache": { "status": "ok", "message": "Redis connected" },
///     "click_queue": { "status": "ok", "message": "Broker reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (db_ok, cache_ok, queue_ok) = tokio::join!(
        state.links.health_check(),
        state.cache.health_check(),
        state.click_queue.health_check(),
    );

    let checks = HealthChecks {
        database: CheckStatus::from_check(db_ok, "Connected", "Database query failed"),
        cache: CheckStatus::from_check(cache_ok, "Redis connected", "Redis connection failed"),
        click_queue: CheckStatus::from_check(queue_ok, "Broker reachable", "Broker unreachable"),
    };

    let all_healthy = checks.database.is_ok() && checks.cache.is_ok() && checks.click_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
