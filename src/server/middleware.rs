/// Authentication extractor for gateway routes.
///
/// Validates the caller's static token before the handler runs:
/// ```ignore
/// async fn handler(_auth: GatewayAuth) -> impl IntoResponse { ... }
/// ```
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use super::auth::{self, ErrorResponse};
use super::AppState;

/// Proof that the request carried the gateway token.
#[derive(Debug, Clone, Copy)]
pub struct GatewayAuth;

impl FromRequestParts<Arc<AppState>> for GatewayAuth {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        auth::verify(&parts.headers, &state.gateway_token).map_err(|failure| {
            warn!(path = %parts.uri.path(), reason = failure.message(), "Rejected request");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(failure.message())),
            )
        })?;

        Ok(GatewayAuth)
    }
}
