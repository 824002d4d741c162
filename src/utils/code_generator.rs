//! Short code generation and validation utilities.
//!
//! Provides cryptographically secure random code generation and validation
//! for custom user-provided codes.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Length of a generated short code.
pub const GENERATED_CODE_LENGTH: usize = 7;

/// Random bytes drawn per code; 6 bytes encode to 8 base64 characters, of
/// which the first 7 are kept.
const CODE_LENGTH_BYTES: usize = 6;

const CUSTOM_CODE_MIN: usize = 3;
const CUSTOM_CODE_MAX: usize = 20;

/// Reserved codes that cannot be used as short links.
///
/// These collide with routes served next to `GET /{shortcode}`.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Generates a cryptographically secure random short code.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing a 7-character code (42 bits).
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_code() -> String {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer);
    code.truncate(GENERATED_CODE_LENGTH);
    code
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters, digits, hyphens, underscores
/// - Cannot be a reserved system path
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any validation rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_code("my-link_2026").is_ok());
///
/// assert!(validate_custom_code("ab").is_err());       // Too short
/// assert!(validate_custom_code("a.b.c").is_err());    // Dot not allowed
/// assert!(validate_custom_code("health").is_err());   // Reserved
/// ```
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < CUSTOM_CODE_MIN || code.len() > CUSTOM_CODE_MAX {
        return Err(AppError::bad_request(
            "customCode must be 3-20 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "customCode can only contain letters, numbers, hyphens and underscores",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
