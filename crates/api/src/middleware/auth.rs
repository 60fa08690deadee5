//! Admin authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::crypto::verify_admin_key;

use crate::app::AppState;
use crate::error::ApiError;

/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Middleware for admin-only routes.
///
/// Requires the `X-Admin-Key` header to match `security.admin_api_key`.
/// While no admin key is configured every request is rejected.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let verdict = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|key| verify_admin_key(key, &state.config.security.admin_api_key));

    match verdict {
        Some(true) => next.run(req).await,
        Some(false) => {
            tracing::warn!(path = %req.uri().path(), "Rejected admin request with invalid key");
            ApiError::Unauthorized("Invalid admin key".to_string()).into_response()
        }
        None => ApiError::Unauthorized("Missing admin key".to_string()).into_response(),
    }
}
