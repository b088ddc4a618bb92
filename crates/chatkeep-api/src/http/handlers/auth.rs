//! Registration, login and current-user handlers.
//!
//! Endpoints:
//! - POST /api/register - Create an account (public)
//! - POST /api/login    - Exchange credentials for a session token (public)
//! - GET  /api/user     - Profile of the authenticated caller

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use chatkeep_types::user::{LoginRequest, LoginResponse, RegisterRequest, UserProfile};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/register - Create an account with default settings.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Value>>), AppError> {
    let start = Instant::now();

    let user_id = state.auth_service.register(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::timed(
            json!({ "id": user_id, "message": "User registered successfully" }),
            start,
        )),
    ))
}

/// POST /api/login - Verify credentials and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let start = Instant::now();

    let user_id = state
        .auth_service
        .verify(&body.username, &body.password)
        .await?;
    let token = state.sessions.issue(&user_id)?;
    let user = state.auth_service.profile(&user_id).await?;

    Ok(Json(ApiResponse::timed(LoginResponse { token, user }, start)))
}

/// GET /api/user - Profile of the caller.
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let start = Instant::now();
    let profile = state.auth_service.profile(&user_id).await?;
    Ok(Json(ApiResponse::timed(profile, start)))
}
