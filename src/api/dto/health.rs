//! DTOs for health check endpoint.

use serde::Serialize;

/// Health check response with component status.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

/// Health status for each backing service.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub cache: CheckStatus,
    pub click_queue: CheckStatus,
}

/// Individual component health status.
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    pub fn from_check(healthy: bool, ok: &str, failed: &str) -> Self {
        if healthy {
            Self {
                status: "ok".to_string(),
                message: Some(ok.to_string()),
            }
        } else {
            Self {
                status: "error".to_string(),
                message: Some(failed.to_string()),
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
