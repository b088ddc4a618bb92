//! ChatRepository trait definition.
//!
//! Every operation is scoped to an owner: a chat id that exists but belongs to
//! someone else is indistinguishable from one that does not exist, except on
//! `save`, where it surfaces as a conflict.

use chatkeep_types::chat::{ChatId, ChatSummary, FullChat, Sender};
use chatkeep_types::error::RepositoryError;
use chatkeep_types::user::UserId;

/// A message ready to be persisted, with its timestamp resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageWrite {
    pub sender: Sender,
    pub content: String,
    pub timestamp: i64,
}

/// Everything needed to create or fully replace a chat.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatWrite {
    pub id: ChatId,
    pub title: String,
    pub preview: String,
    pub timestamp: i64,
    /// Replaces the chat's previous messages, in this order.
    pub messages: Vec<MessageWrite>,
}

/// Repository trait for chat and message persistence.
///
/// Implementations live in chatkeep-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// List summaries of all chats owned by `owner`, in no particular order.
    fn list_summaries(
        &self,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSummary>, RepositoryError>> + Send;

    /// List all chats owned by `owner` with their messages, newest first.
    fn list_with_messages(
        &self,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<FullChat>, RepositoryError>> + Send;

    /// Get one chat with its messages, if `owner` owns it.
    fn get(
        &self,
        owner: &UserId,
        id: &ChatId,
    ) -> impl std::future::Future<Output = Result<Option<FullChat>, RepositoryError>> + Send;

    /// Create the chat, or replace title, preview, timestamp and every message
    /// of the existing one, as a single transaction.
    ///
    /// Returns `RepositoryError::Conflict` if the id belongs to another owner.
    fn save(
        &self,
        owner: &UserId,
        chat: &ChatWrite,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete one chat and its messages. Returns `false` if `owner` has no such chat.
    fn delete(
        &self,
        owner: &UserId,
        id: &ChatId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete every chat owned by `owner`. Returns the number removed.
    fn delete_all(
        &self,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Ids of all chats owned by `owner`, newest first.
    fn list_ids_newest_first(
        &self,
        owner: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatId>, RepositoryError>> + Send;

    /// Delete the given chats (ignoring ids `owner` does not own). Returns the number removed.
    fn delete_many(
        &self,
        owner: &UserId,
        ids: &[ChatId],
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Delete chats owned by `owner` whose timestamp is strictly before `cutoff_ms`.
    fn delete_older_than(
        &self,
        owner: &UserId,
        cutoff_ms: i64,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
