/// Static-token gateway authentication.
///
/// Callers present the shared gateway token either as
/// `Authorization: Bearer <token>` or as `X-Auth-Token: <token>`. There is
/// no session or token issuance: the token is a deployment secret.
use axum::http::HeaderMap;
use serde::Serialize;

use crate::upstream::leshan::AUTH_TOKEN_HEADER;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Why a request failed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Missing,
    Malformed,
    Invalid,
}

impl AuthFailure {
    pub fn message(self) -> &'static str {
        match self {
            AuthFailure::Missing => "Missing Authorization header",
            AuthFailure::Malformed => "Invalid Authorization format",
            AuthFailure::Invalid => "Invalid token",
        }
    }
}

/// Pull the presented token out of the request headers.
pub fn presented_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    if let Some(value) = headers.get("Authorization") {
        let value = value.to_str().map_err(|_| AuthFailure::Malformed)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(AuthFailure::Malformed)?
            .trim();
        if token.is_empty() {
            return Err(AuthFailure::Missing);
        }
        return Ok(token);
    }

    headers
        .get(AUTH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthFailure::Missing)
}

/// Check the request headers against the configured gateway token.
pub fn verify(headers: &HeaderMap, expected: &str) -> Result<(), AuthFailure> {
    let token = presented_token(headers)?;
    if token != expected {
        return Err(AuthFailure::Invalid);
    }
    Ok(())
}
