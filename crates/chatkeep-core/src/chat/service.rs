//! Chat store: owner-scoped chat CRUD with storage-limit enforcement on save.
//!
//! `ChatService` is generic over the chat and settings repositories so the
//! same logic runs against SQLite in production and in-memory stores in tests.

use std::collections::HashMap;
use std::sync::Arc;

use chatkeep_types::chat::{
    ChatId, ChatSummary, FullChat, NewMessage, SaveChatRequest, Sender,
};
use chatkeep_types::error::ChatError;
use chatkeep_types::user::UserId;

use crate::chat::repository::{ChatRepository, ChatWrite, MessageWrite};
use crate::repository::settings::SettingsRepository;
use crate::retention::RetentionEngine;
use crate::service::clock::SharedClock;

/// Longest preview kept verbatim, in characters.
pub const PREVIEW_MAX_CHARS: usize = 30;

/// Characters kept before the ellipsis when a preview is truncated.
const PREVIEW_TRUNCATED_CHARS: usize = 27;

/// Preview for chats without any user-authored message.
pub const EMPTY_PREVIEW: &str = "New chat";

pub const MAX_TITLE_LEN: usize = 200;

pub struct ChatService<C: ChatRepository, S: SettingsRepository> {
    chats: C,
    retention: Arc<RetentionEngine<C, S>>,
    clock: SharedClock,
}

impl<C: ChatRepository, S: SettingsRepository> ChatService<C, S> {
    pub fn new(chats: C, retention: Arc<RetentionEngine<C, S>>, clock: SharedClock) -> Self {
        Self {
            chats,
            retention,
            clock,
        }
    }

    /// Summaries of every chat `owner` has, keyed by id.
    pub async fn list_summaries(
        &self,
        owner: &UserId,
    ) -> Result<HashMap<ChatId, ChatSummary>, ChatError> {
        let summaries = self.chats.list_summaries(owner).await?;
        Ok(summaries.into_iter().map(|s| (s.id.clone(), s)).collect())
    }

    /// Every chat with its messages, most recent first.
    pub async fn list_sorted_with_messages(&self, owner: &UserId) -> Result<Vec<FullChat>, ChatError> {
        Ok(self.chats.list_with_messages(owner).await?)
    }

    pub async fn get(&self, owner: &UserId, id: &ChatId) -> Result<FullChat, ChatError> {
        self.chats.get(owner, id).await?.ok_or(ChatError::NotFound)
    }

    /// Create or fully replace a chat, then trim the owner's history to
    /// their storage limit.
    ///
    /// The returned chat is read back from the store. A failing limit
    /// enforcement is logged and does not fail the save.
    pub async fn save(&self, owner: &UserId, request: SaveChatRequest) -> Result<FullChat, ChatError> {
        let id: ChatId = request.id.parse().map_err(ChatError::InvalidInput)?;
        let title = request.title;
        if title.trim().is_empty() {
            return Err(ChatError::InvalidInput("title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ChatError::InvalidInput(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        let Some(messages) = request.messages else {
            return Err(ChatError::InvalidInput("messages are required".to_string()));
        };

        let now = self.clock.now_millis();
        let write = ChatWrite {
            id: id.clone(),
            title,
            preview: derive_preview(&messages),
            timestamp: now,
            messages: messages
                .into_iter()
                .map(|m| MessageWrite {
                    sender: m.sender.unwrap_or_default(),
                    content: m.content,
                    timestamp: m.timestamp.unwrap_or(now),
                })
                .collect(),
        };

        self.chats.save(owner, &write).await?;
        tracing::debug!(user_id = %owner, chat_id = %id, messages = write.messages.len(), "chat saved");

        if let Err(e) = self.retention.enforce_storage_limit(owner).await {
            tracing::warn!(user_id = %owner, error = %e, "storage limit enforcement failed after save");
        }

        // NotFound here means a concurrent save evicted this chat already.
        self.get(owner, &id).await
    }

    /// Delete one chat and its messages.
    pub async fn delete(&self, owner: &UserId, id: &ChatId) -> Result<(), ChatError> {
        if self.chats.delete(owner, id).await? {
            tracing::debug!(user_id = %owner, chat_id = %id, "chat deleted");
            Ok(())
        } else {
            Err(ChatError::NotFound)
        }
    }

    /// Delete every chat of `owner`. Returns how many were removed.
    pub async fn clear_all(&self, owner: &UserId) -> Result<u64, ChatError> {
        let deleted = self.chats.delete_all(owner).await?;
        tracing::info!(user_id = %owner, deleted, "chat history cleared");
        Ok(deleted)
    }

    /// A fresh chat id of the form `chat_{epoch_ms}_{7 hex chars}`.
    pub fn generate_id(&self) -> ChatId {
        ChatId::generate(self.clock.now_millis())
    }
}

/// Preview of a message list: the first user message, shortened to
/// 27 characters plus "..." when longer than 30.
pub fn derive_preview(messages: &[NewMessage]) -> String {
    let Some(first) = messages.iter().find(|m| m.sender == Some(Sender::User)) else {
        return EMPTY_PREVIEW.to_string();
    };
    if first.content.chars().count() > PREVIEW_MAX_CHARS {
        let head: String = first.content.chars().take(PREVIEW_TRUNCATED_CHARS).collect();
        format!("{head}...")
    } else {
        first.content.clone()
    }
}
