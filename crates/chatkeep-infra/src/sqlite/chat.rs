//! SQLite chat repository implementation.
//!
//! Messages keep their submitted order in a `position` column. Deleting a
//! chat relies on `ON DELETE CASCADE` to remove its messages.

use std::collections::HashMap;

use chatkeep_core::chat::repository::{ChatRepository, ChatWrite};
use chatkeep_types::chat::{ChatId, ChatSummary, FullChat, Message, Sender};
use chatkeep_types::error::RepositoryError;
use chatkeep_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::query_error;

/// SQLite-backed implementation of [`ChatRepository`].
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: String,
    title: String,
    preview: String,
    timestamp: i64,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            preview: row.try_get("preview")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_summary(self) -> Result<ChatSummary, RepositoryError> {
        Ok(ChatSummary {
            id: parse_chat_id(&self.id)?,
            title: self.title,
            timestamp: self.timestamp,
            preview: self.preview,
        })
    }

    fn into_chat(self, messages: Vec<Message>) -> Result<FullChat, RepositoryError> {
        let summary = self.into_summary()?;
        Ok(FullChat {
            id: summary.id,
            title: summary.title,
            timestamp: summary.timestamp,
            preview: summary.preview,
            messages,
        })
    }
}

struct MessageRow {
    id: i64,
    chat_id: String,
    sender: String,
    content: String,
    timestamp: i64,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            sender: row.try_get("sender")?,
            content: row.try_get("content")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let sender: Sender = self.sender.parse().map_err(RepositoryError::Query)?;
        Ok(Message {
            id: self.id,
            sender,
            content: self.content,
            timestamp: self.timestamp,
        })
    }
}

fn parse_chat_id(s: &str) -> Result<ChatId, RepositoryError> {
    s.parse()
        .map_err(|e: String| RepositoryError::Query(format!("invalid chat id: {e}")))
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn list_summaries(&self, owner: &UserId) -> Result<Vec<ChatSummary>, RepositoryError> {
        let rows = sqlx::query("SELECT id, title, preview, timestamp FROM chats WHERE owner_id = ?")
            .bind(owner.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row = ChatRow::from_row(row).map_err(query_error)?;
            summaries.push(chat_row.into_summary()?);
        }
        Ok(summaries)
    }

    async fn list_with_messages(&self, owner: &UserId) -> Result<Vec<FullChat>, RepositoryError> {
        // One read transaction so chats and messages come from the same snapshot.
        let mut tx = self.pool.reader.begin().await.map_err(query_error)?;

        let chat_rows = sqlx::query(
            "SELECT id, title, preview, timestamp FROM chats
             WHERE owner_id = ? ORDER BY timestamp DESC, rowid DESC",
        )
        .bind(owner.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(query_error)?;

        let message_rows = sqlx::query(
            "SELECT m.id, m.chat_id, m.sender, m.content, m.timestamp
             FROM messages m JOIN chats c ON c.id = m.chat_id
             WHERE c.owner_id = ? ORDER BY m.chat_id, m.position",
        )
        .bind(owner.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        let mut by_chat: HashMap<String, Vec<Message>> = HashMap::new();
        for row in &message_rows {
            let msg_row = MessageRow::from_row(row).map_err(query_error)?;
            let chat_id = msg_row.chat_id.clone();
            by_chat.entry(chat_id).or_default().push(msg_row.into_message()?);
        }

        let mut chats = Vec::with_capacity(chat_rows.len());
        for row in &chat_rows {
            let chat_row = ChatRow::from_row(row).map_err(query_error)?;
            let messages = by_chat.remove(&chat_row.id).unwrap_or_default();
            chats.push(chat_row.into_chat(messages)?);
        }
        Ok(chats)
    }

    async fn get(&self, owner: &UserId, id: &ChatId) -> Result<Option<FullChat>, RepositoryError> {
        let mut tx = self.pool.reader.begin().await.map_err(query_error)?;

        let row = sqlx::query(
            "SELECT id, title, preview, timestamp FROM chats WHERE id = ? AND owner_id = ?",
        )
        .bind(id.as_str())
        .bind(owner.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let message_rows = sqlx::query(
            "SELECT id, chat_id, sender, content, timestamp FROM messages
             WHERE chat_id = ? ORDER BY position",
        )
        .bind(id.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        let mut messages = Vec::with_capacity(message_rows.len());
        for row in &message_rows {
            let msg_row = MessageRow::from_row(row).map_err(query_error)?;
            messages.push(msg_row.into_message()?);
        }

        let chat_row = ChatRow::from_row(&row).map_err(query_error)?;
        Ok(Some(chat_row.into_chat(messages)?))
    }

    async fn save(&self, owner: &UserId, chat: &ChatWrite) -> Result<(), RepositoryError> {
        let owner_id = owner.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let existing: Option<String> = sqlx::query_scalar("SELECT owner_id FROM chats WHERE id = ?")
            .bind(chat.id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;

        match existing {
            Some(current) if current != owner_id => {
                return Err(RepositoryError::Conflict(chat.id.to_string()));
            }
            Some(_) => {
                sqlx::query("UPDATE chats SET title = ?, preview = ?, timestamp = ? WHERE id = ?")
                    .bind(&chat.title)
                    .bind(&chat.preview)
                    .bind(chat.timestamp)
                    .bind(chat.id.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(query_error)?;

                sqlx::query("DELETE FROM messages WHERE chat_id = ?")
                    .bind(chat.id.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(query_error)?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO chats (id, owner_id, title, preview, timestamp) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(chat.id.as_str())
                .bind(&owner_id)
                .bind(&chat.title)
                .bind(&chat.preview)
                .bind(chat.timestamp)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
            }
        }

        for (position, message) in chat.messages.iter().enumerate() {
            sqlx::query(
                "INSERT INTO messages (chat_id, position, sender, content, timestamp)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(chat.id.as_str())
            .bind(position as i64)
            .bind(message.sender.to_string())
            .bind(&message.content)
            .bind(message.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        tx.commit().await.map_err(query_error)
    }

    async fn delete(&self, owner: &UserId, id: &ChatId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ? AND owner_id = ?")
            .bind(id.as_str())
            .bind(owner.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, owner: &UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE owner_id = ?")
            .bind(owner.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected())
    }

    async fn list_ids_newest_first(&self, owner: &UserId) -> Result<Vec<ChatId>, RepositoryError> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM chats WHERE owner_id = ? ORDER BY timestamp DESC, rowid DESC",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        ids.iter().map(|id| parse_chat_id(id)).collect()
    }

    async fn delete_many(&self, owner: &UserId, ids: &[ChatId]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let owner_id = owner.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;
        let mut deleted = 0;
        for id in ids {
            let result = sqlx::query("DELETE FROM chats WHERE id = ? AND owner_id = ?")
                .bind(id.as_str())
                .bind(&owner_id)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
            deleted += result.rows_affected();
        }
        tx.commit().await.map_err(query_error)?;
        Ok(deleted)
    }

    async fn delete_older_than(&self, owner: &UserId, cutoff_ms: i64) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE owner_id = ? AND timestamp < ?")
            .bind(owner.to_string())
            .bind(cutoff_ms)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::testing::{insert_user, test_pool};
    use chatkeep_core::chat::repository::MessageWrite;

    fn write(id: &str, timestamp: i64, contents: &[&str]) -> ChatWrite {
        ChatWrite {
            id: id.parse().unwrap(),
            title: format!("title {id}"),
            preview: "New chat".to_string(),
            timestamp,
            messages: contents
                .iter()
                .enumerate()
                .map(|(i, c)| MessageWrite {
                    sender: if i % 2 == 0 { Sender::User } else { Sender::Assistant },
                    content: c.to_string(),
                    timestamp: timestamp + i as i64,
                })
                .collect(),
        }
    }

    fn chat_id(s: &str) -> ChatId {
        s.parse().unwrap()
    }

    async fn message_count(pool: &DatabasePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_save_and_get_preserves_message_order() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "alice").await;
        let repo = SqliteChatRepository::new(pool);

        repo.save(&user, &write("c1", 1_000, &["one", "two", "three"]))
            .await
            .unwrap();

        let chat = repo.get(&user, &chat_id("c1")).await.unwrap().unwrap();
        assert_eq!(chat.title, "title c1");
        assert_eq!(chat.timestamp, 1_000);
        let contents: Vec<&str> = chat.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(chat.messages[1].sender, Sender::Assistant);
        assert_eq!(chat.messages[2].timestamp, 1_002);
    }

    #[tokio::test]
    async fn test_resave_replaces_all_messages() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "alice").await;
        let repo = SqliteChatRepository::new(pool.clone());

        repo.save(&user, &write("c1", 1_000, &["A", "B"])).await.unwrap();
        repo.save(&user, &write("c1", 2_000, &["C"])).await.unwrap();

        let chat = repo.get(&user, &chat_id("c1")).await.unwrap().unwrap();
        assert_eq!(chat.timestamp, 2_000);
        let contents: Vec<&str> = chat.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["C"]);
        assert_eq!(message_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_failed_resave_keeps_previous_chat() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "alice").await;
        let repo = SqliteChatRepository::new(pool.clone());

        repo.save(&user, &write("c1", 1_000, &["A", "B"])).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER fail_messages BEFORE INSERT ON messages
             BEGIN SELECT RAISE(ABORT, 'message insert rejected'); END",
        )
        .execute(&pool.writer)
        .await
        .unwrap();

        let mut replacement = write("c1", 2_000, &["C"]);
        replacement.title = "renamed".to_string();
        assert!(repo.save(&user, &replacement).await.is_err());

        let chat = repo.get(&user, &chat_id("c1")).await.unwrap().unwrap();
        assert_eq!(chat.title, "title c1");
        assert_eq!(chat.timestamp, 1_000);
        let contents: Vec<&str> = chat.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "B"]);
        assert_eq!(message_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_save_conflicts_across_owners() {
        let pool = test_pool().await;
        let alice = insert_user(&pool, "alice").await;
        let bob = insert_user(&pool, "bob").await;
        let repo = SqliteChatRepository::new(pool);

        repo.save(&alice, &write("c1", 1, &["hers"])).await.unwrap();
        let err = repo.save(&bob, &write("c1", 2, &["his"])).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let chat = repo.get(&alice, &chat_id("c1")).await.unwrap().unwrap();
        assert_eq!(chat.messages[0].content, "hers");
        assert!(repo.get(&bob, &chat_id("c1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_messages_newest_first() {
        let pool = test_pool().await;
        let alice = insert_user(&pool, "alice").await;
        let bob = insert_user(&pool, "bob").await;
        let repo = SqliteChatRepository::new(pool);

        repo.save(&alice, &write("old", 1_000, &["o1", "o2"])).await.unwrap();
        repo.save(&alice, &write("new", 3_000, &["n1"])).await.unwrap();
        repo.save(&alice, &write("empty", 2_000, &[])).await.unwrap();
        repo.save(&bob, &write("bobs", 5_000, &["b"])).await.unwrap();

        let chats = repo.list_with_messages(&alice).await.unwrap();
        let ids: Vec<&str> = chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "empty", "old"]);
        assert_eq!(chats[0].messages.len(), 1);
        assert!(chats[1].messages.is_empty());
        let old: Vec<&str> = chats[2].messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(old, vec!["o1", "o2"]);

        let summaries = repo.list_summaries(&alice).await.unwrap();
        assert_eq!(summaries.len(), 3);
    }

    #[tokio::test]
    async fn test_ids_newest_first_breaks_ties_by_insertion() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "alice").await;
        let repo = SqliteChatRepository::new(pool);

        repo.save(&user, &write("first", 1_000, &[])).await.unwrap();
        repo.save(&user, &write("second", 1_000, &[])).await.unwrap();
        repo.save(&user, &write("older", 500, &[])).await.unwrap();

        let ids = repo.list_ids_newest_first(&user).await.unwrap();
        let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first", "older"]);
    }

    #[tokio::test]
    async fn test_delete_is_owner_scoped_and_cascades() {
        let pool = test_pool().await;
        let alice = insert_user(&pool, "alice").await;
        let bob = insert_user(&pool, "bob").await;
        let repo = SqliteChatRepository::new(pool.clone());

        repo.save(&alice, &write("c1", 1, &["a", "b"])).await.unwrap();
        assert!(!repo.delete(&bob, &chat_id("c1")).await.unwrap());
        assert!(!repo.delete(&alice, &chat_id("missing")).await.unwrap());
        assert_eq!(message_count(&pool).await, 2);

        assert!(repo.delete(&alice, &chat_id("c1")).await.unwrap());
        assert_eq!(message_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_delete_all_and_delete_many() {
        let pool = test_pool().await;
        let alice = insert_user(&pool, "alice").await;
        let bob = insert_user(&pool, "bob").await;
        let repo = SqliteChatRepository::new(pool.clone());

        for id in ["a1", "a2", "a3"] {
            repo.save(&alice, &write(id, 1, &["x"])).await.unwrap();
        }
        repo.save(&bob, &write("b1", 1, &["y"])).await.unwrap();

        let deleted = repo
            .delete_many(&alice, &[chat_id("a1"), chat_id("b1"), chat_id("nope")])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(repo.delete_many(&alice, &[]).await.unwrap(), 0);

        assert_eq!(repo.delete_all(&alice).await.unwrap(), 2);
        assert_eq!(repo.delete_all(&alice).await.unwrap(), 0);
        assert_eq!(repo.list_summaries(&bob).await.unwrap().len(), 1);
        assert_eq!(message_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_delete_older_than_is_strict() {
        let pool = test_pool().await;
        let user = insert_user(&pool, "alice").await;
        let repo = SqliteChatRepository::new(pool);

        repo.save(&user, &write("before", 999, &[])).await.unwrap();
        repo.save(&user, &write("at", 1_000, &[])).await.unwrap();
        repo.save(&user, &write("after", 1_001, &[])).await.unwrap();

        assert_eq!(repo.delete_older_than(&user, 1_000).await.unwrap(), 1);
        let ids = repo.list_ids_newest_first(&user).await.unwrap();
        let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["after", "at"]);
    }
}
