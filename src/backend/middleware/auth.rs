/**
 * Authentication Extractor
 *
 * Extracts and verifies the bearer token from the `Authorization` header and
 * hands the caller's user id to the handler. Missing or invalid tokens are
 * rejected with 401 before the handler runs.
 */

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::chat::UserId;

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Axum extractor for the authenticated caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            tracing::warn!("Missing or malformed Authorization header");
            BackendError::unauthorized("missing bearer token")
        })?;

        let claims = verify_token(&state.jwt_secret, token).map_err(|e| {
            tracing::warn!(error = %e, "Invalid token");
            BackendError::unauthorized("invalid token")
        })?;

        Ok(AuthUser(claims.user_id()?))
    }
}
