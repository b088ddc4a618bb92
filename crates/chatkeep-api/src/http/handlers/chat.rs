//! Chat history handlers.
//!
//! Endpoints:
//! - GET    /api/chats            - Summaries keyed by chat id
//! - GET    /api/chats/sorted     - Full chats, newest first
//! - POST   /api/chats            - Create or replace a chat
//! - DELETE /api/chats            - Clear the caller's history
//! - GET    /api/chats/{id}       - One chat with its messages
//! - DELETE /api/chats/{id}       - Delete one chat
//! - GET    /api/generate-chat-id - A fresh chat id

use std::collections::HashMap;
use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use chatkeep_types::chat::{ChatId, ChatSummary, FullChat, SaveChatRequest};
use chatkeep_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// An id that fails validation can never name a stored chat.
fn parse_chat_id(raw: &str) -> Result<ChatId, AppError> {
    raw.parse().map_err(|_| AppError::Chat(ChatError::NotFound))
}

/// GET /api/chats
pub async fn list_chats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<HashMap<ChatId, ChatSummary>>>, AppError> {
    let start = Instant::now();
    let chats = state.chat_service.list_summaries(&user_id).await?;
    Ok(Json(ApiResponse::timed(chats, start)))
}

/// GET /api/chats/sorted
pub async fn list_chats_sorted(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Vec<FullChat>>>, AppError> {
    let start = Instant::now();
    let chats = state.chat_service.list_sorted_with_messages(&user_id).await?;
    Ok(Json(ApiResponse::timed(chats, start)))
}

/// GET /api/chats/{id}
pub async fn get_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FullChat>>, AppError> {
    let start = Instant::now();
    let id = parse_chat_id(&id)?;
    let chat = state.chat_service.get(&user_id, &id).await?;
    Ok(Json(ApiResponse::timed(chat, start)))
}

/// POST /api/chats - Returns the chat as stored.
pub async fn save_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SaveChatRequest>,
) -> Result<Json<ApiResponse<FullChat>>, AppError> {
    let start = Instant::now();
    let chat = state.chat_service.save(&user_id, body).await?;
    Ok(Json(ApiResponse::timed(chat, start)))
}

/// DELETE /api/chats/{id}
pub async fn delete_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let id = parse_chat_id(&id)?;
    state.chat_service.delete(&user_id, &id).await?;
    Ok(Json(ApiResponse::timed(
        json!({ "message": "Chat deleted successfully" }),
        start,
    )))
}

/// DELETE /api/chats
pub async fn clear_chats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let deleted = state.chat_service.clear_all(&user_id).await?;
    Ok(Json(ApiResponse::timed(
        json!({ "message": "All chats cleared successfully", "deleted": deleted }),
        start,
    )))
}

/// GET /api/generate-chat-id
pub async fn generate_chat_id(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Json<ApiResponse<Value>> {
    let start = Instant::now();
    let id = state.chat_service.generate_id();
    Json(ApiResponse::timed(json!({ "id": id }), start))
}
