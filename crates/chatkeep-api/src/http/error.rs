//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use chatkeep_types::error::{AuthError, ChatError, SettingsError};

use crate::http::response::{ApiResponse, new_request_id};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Auth(AuthError),
    Chat(ChatError),
    Settings(SettingsError),
    /// Malformed request outside any service's own validation.
    Validation(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        AppError::Settings(e)
    }
}

impl AppError {
    /// Status, error code and client-facing message.
    ///
    /// Storage and crypto failures are reported as a bare internal error; the
    /// detail only goes to the log.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(AuthError::InvalidInput(msg))
            | AppError::Chat(ChatError::InvalidInput(msg))
            | AppError::Settings(SettingsError::InvalidInput(msg))
            | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Auth(AuthError::Conflict(what)) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("{} already exists", capitalize(what)),
            ),
            AppError::Auth(AuthError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid credentials or session".to_string(),
            ),
            AppError::Chat(ChatError::NotFound) => (
                StatusCode::NOT_FOUND,
                "CHAT_NOT_FOUND",
                "Chat not found".to_string(),
            ),
            AppError::Chat(ChatError::Conflict(id)) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Chat id '{id}' is already in use"),
            ),
            AppError::Auth(AuthError::Storage(_) | AuthError::Crypto(_))
            | AppError::Chat(ChatError::Storage(_))
            | AppError::Settings(SettingsError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let request_id = new_request_id();

        if status.is_server_error() {
            tracing::error!(%request_id, error = ?self, "request failed");
        } else {
            tracing::debug!(%request_id, %status, code, "request rejected");
        }

        (
            status,
            Json(ApiResponse::error(code, &message, request_id, 0)),
        )
            .into_response()
    }
}
