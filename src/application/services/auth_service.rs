//! Authentication service for API access tokens.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;

/// Claims carried by an access token.
///
/// Tokens are issued by a separate identity service; this service only
/// verifies them with the shared `JWT_ACCESS_SECRET`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: String,
    pub email: String,
    pub exp: u64,
}

/// Identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
}

/// Verifies HS256 access tokens.
pub struct AuthService {
    key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    /// Creates a verifier for tokens signed with `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verifies a raw bearer token and returns the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the signature is invalid, the
    /// token has expired or its claims are malformed.
    pub fn authenticate(&self, token: &str) -> Result<AuthContext, AppError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "Access token verification failed");
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token has expired",
                _ => "Invalid or expired token",
            };
            AppError::unauthorized("Unauthorized", json!({ "reason": reason }))
        })?;

        Ok(AuthContext {
            user_id: data.claims.user_id,
            email: data.claims.email,
        })
    }
}
