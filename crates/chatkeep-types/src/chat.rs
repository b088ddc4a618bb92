//! Chat and message types.
//!
//! A chat is a titled, timestamped conversation owned by one user. Its
//! messages are an ordered list that is replaced wholesale on every save.
//! All timestamps are milliseconds since the Unix epoch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Maximum length of a chat id, in characters.
pub const MAX_CHAT_ID_LEN: usize = 50;

/// Caller-supplied chat identifier.
///
/// The format is opaque; ids produced by the server look like
/// `chat_1718000000000_a1b2c3d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// A fresh id: `chat_{epoch_ms}_{7 random lowercase hex chars}`.
    pub fn generate(now_ms: i64) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("chat_{now_ms}_{}", &random[..7]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChatId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("chat id cannot be empty".to_string());
        }
        if s.chars().count() > MAX_CHAT_ID_LEN {
            return Err(format!(
                "chat id must be at most {MAX_CHAT_ID_LEN} characters"
            ));
        }
        Ok(Self(s.to_string()))
    }
}

/// Who authored a message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (sender IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    #[default]
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "assistant" => Ok(Sender::Assistant),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A stored message within a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Auto-assigned by the store.
    pub id: i64,
    pub sender: Sender,
    pub content: String,
    pub timestamp: i64,
}

/// A message as submitted by a client when saving a chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Stored as [`Sender::User`] when absent, but only an explicit `"user"`
    /// counts towards the chat preview.
    #[serde(default)]
    pub sender: Option<Sender>,
    #[serde(default)]
    pub content: String,
    /// Defaults to the save time when absent.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl NewMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender: Some(sender),
            content: content.into(),
            timestamp: None,
        }
    }
}

/// Listing entry for a chat (no messages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
    pub timestamp: i64,
    pub preview: String,
}

/// A chat together with its messages in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullChat {
    pub id: ChatId,
    pub title: String,
    pub timestamp: i64,
    pub preview: String,
    pub messages: Vec<Message>,
}

/// Request body for saving (creating or replacing) a chat.
///
/// `messages` must be present, though it may be empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveChatRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Option<Vec<NewMessage>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_roundtrip() {
        for sender in [Sender::User, Sender::Assistant] {
            let parsed: Sender = sender.to_string().parse().unwrap();
            assert_eq!(sender, parsed);
        }
        assert!("system".parse::<Sender>().is_err());
    }

    #[test]
    fn test_new_message_defaults() {
        let msg: NewMessage = serde_json::from_str("{}").unwrap();
        assert!(msg.sender.is_none());
        assert_eq!(Sender::default(), Sender::User);
        assert_eq!(msg.content, "");
        assert!(msg.timestamp.is_none());
    }

    #[test]
    fn test_new_message_rejects_unknown_sender() {
        let res = serde_json::from_str::<NewMessage>(r#"{"sender":"robot"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_chat_id_validation() {
        assert_eq!("  c1 ".parse::<ChatId>().unwrap().as_str(), "  c1 ");
        assert!("".parse::<ChatId>().is_err());
        assert!("   ".parse::<ChatId>().is_err());
        assert!("x".repeat(MAX_CHAT_ID_LEN + 1).parse::<ChatId>().is_err());
        assert!("x".repeat(MAX_CHAT_ID_LEN).parse::<ChatId>().is_ok());
    }

    #[test]
    fn test_chat_id_serializes_as_plain_string() {
        let id: ChatId = "chat_1".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"chat_1\"");
    }

    #[test]
    fn test_save_request_distinguishes_missing_messages() {
        let req: SaveChatRequest = serde_json::from_str(r#"{"id":"c1","title":"t"}"#).unwrap();
        assert!(req.messages.is_none());

        let req: SaveChatRequest =
            serde_json::from_str(r#"{"id":"c1","title":"t","messages":[]}"#).unwrap();
        assert_eq!(req.messages, Some(vec![]));
    }
}
