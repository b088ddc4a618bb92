//! Bearer-token authentication extractor.
//!
//! Reads `Authorization: Bearer <token>` and resolves it to the user it was
//! issued for. Handlers receive the caller as an explicit [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use chatkeep_types::error::AuthError;
use chatkeep_types::user::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Auth(AuthError::Unauthorized))?;
        let user_id = state.sessions.validate(token).await?;
        Ok(AuthUser(user_id))
    }
}

/// The token from an `Authorization: Bearer` header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
