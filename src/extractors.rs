use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// The acting user's id, taken from the `x-user-id` header.
///
/// The header is set by whatever fronts this service and authenticates
/// credentials; this extractor only parses it. Returns 401 when the header
/// is missing or not a number.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub i64);

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or(AppError::Unauthenticated)?;

        Ok(Actor(id))
    }
}
