//! In-memory repositories and fakes for service tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use chatkeep_types::chat::{ChatId, ChatSummary, FullChat, Message};
use chatkeep_types::error::RepositoryError;
use chatkeep_types::settings::Settings;
use chatkeep_types::user::{SessionClaims, User, UserId};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::chat::repository::{ChatRepository, ChatWrite};
use crate::repository::settings::SettingsRepository;
use crate::repository::user::UserRepository;
use crate::service::clock::Clock;
use crate::service::credential::CredentialHasher;
use crate::service::token::TokenCodec;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Starts at 2025-01-01T00:00:00Z.
    pub fn new() -> Arc<Self> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Arc::new(Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        })
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(ms).unwrap()
    }
}

// ---------------------------------------------------------------------------
// Crypto fakes
// ---------------------------------------------------------------------------

/// Reversible "hash" that is easy to assert on.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> Result<String, String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        stored_hash.strip_prefix("plain:") == Some(password)
    }
}

/// JSON claims behind a fixed marker, standing in for a signature.
pub struct MarkerCodec;

impl TokenCodec for MarkerCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String, String> {
        Ok(format!("signed:{}|{}|{}", claims.sub, claims.iat, claims.exp))
    }

    fn decode(&self, token: &str) -> Option<SessionClaims> {
        let body = token.strip_prefix("signed:")?;
        let mut parts = body.split('|');
        let sub = parts.next()?.to_string();
        let iat = parts.next()?.parse().ok()?;
        let exp = parts.next()?.parse().ok()?;
        Some(SessionClaims { sub, iat, exp })
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

struct StoredChat {
    owner: UserId,
    chat: FullChat,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    settings: BTreeMap<(UserId, String), String>,
    /// Insertion order doubles as the tie-breaker for equal timestamps.
    chats: Vec<StoredChat>,
    next_message_id: i64,
}

/// Shared backing store for the in-memory repositories.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    /// Make every chat deletion fail.
    pub fail_chat_deletes: AtomicBool,
    /// Make chat deletions fail for these owners only.
    pub fail_chat_deletes_for: Mutex<HashSet<UserId>>,
    /// Make settings reads fail for these users.
    pub fail_settings_for: Mutex<HashSet<UserId>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn chat_count(&self, owner: &UserId) -> usize {
        let state = self.state.lock().unwrap();
        state.chats.iter().filter(|c| &c.owner == owner).count()
    }

    /// Insert a chat directly, bypassing the service (for retention fixtures).
    pub fn insert_chat(&self, owner: UserId, id: &str, timestamp: i64) {
        let mut state = self.state.lock().unwrap();
        state.chats.push(StoredChat {
            owner,
            chat: FullChat {
                id: id.parse().unwrap(),
                title: id.to_string(),
                timestamp,
                preview: "New chat".to_string(),
                messages: Vec::new(),
            },
        });
    }

    pub fn set_setting(&self, user: UserId, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        state.settings.insert((user, key.to_string()), value.to_string());
    }

    fn check_chat_deletes(&self, owner: &UserId) -> Result<(), RepositoryError> {
        if self.fail_chat_deletes.load(Ordering::SeqCst)
            || self.fail_chat_deletes_for.lock().unwrap().contains(owner)
        {
            Err(RepositoryError::Query("injected delete failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_settings(&self, user: &UserId) -> Result<(), RepositoryError> {
        if self.fail_settings_for.lock().unwrap().contains(user) {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }
}

#[derive(Clone)]
pub struct MemoryUsers(pub Arc<MemoryStore>);

#[derive(Clone)]
pub struct MemorySettings(pub Arc<MemoryStore>);

#[derive(Clone)]
pub struct MemoryChats(pub Arc<MemoryStore>);

impl UserRepository for MemoryUsers {
    async fn create(&self, user: &User, initial: &Settings) -> Result<User, RepositoryError> {
        let mut state = self.0.state.lock().unwrap();
        if state.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict("username".to_string()));
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email".to_string()));
        }
        state.users.insert(user.id, user.clone());
        for (key, value) in initial {
            state.settings.insert((user.id, key.clone()), value.clone());
        }
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.0.state.lock().unwrap().users.get(id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.0.state.lock().unwrap();
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.0.state.lock().unwrap();
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut state = self.0.state.lock().unwrap();
        let user = state.users.get_mut(id).ok_or(RepositoryError::NotFound)?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        let mut state = self.0.state.lock().unwrap();
        state.users.remove(id).ok_or(RepositoryError::NotFound)?;
        state.chats.retain(|c| &c.owner != id);
        state.settings.retain(|(user, _), _| user != id);
        Ok(())
    }
}

impl SettingsRepository for MemorySettings {
    async fn get_all(&self, user_id: &UserId) -> Result<Settings, RepositoryError> {
        self.0.check_settings(user_id)?;
        let state = self.0.state.lock().unwrap();
        Ok(state
            .settings
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn get(&self, user_id: &UserId, key: &str) -> Result<Option<String>, RepositoryError> {
        self.0.check_settings(user_id)?;
        let state = self.0.state.lock().unwrap();
        Ok(state.settings.get(&(*user_id, key.to_string())).cloned())
    }

    async fn upsert(&self, user_id: &UserId, values: &Settings) -> Result<(), RepositoryError> {
        self.0.check_settings(user_id)?;
        let mut state = self.0.state.lock().unwrap();
        for (key, value) in values {
            state.settings.insert((*user_id, key.clone()), value.clone());
        }
        Ok(())
    }

    async fn list_by_key(&self, key: &str) -> Result<Vec<(UserId, String)>, RepositoryError> {
        let state = self.0.state.lock().unwrap();
        Ok(state
            .settings
            .iter()
            .filter(|((_, k), _)| k == key)
            .map(|((user, _), value)| (*user, value.clone()))
            .collect())
    }
}

impl MemoryChats {
    /// Owned chats newest first; later inserts win ties.
    fn sorted(state: &State, owner: &UserId) -> Vec<FullChat> {
        let mut owned: Vec<(usize, &FullChat)> = state
            .chats
            .iter()
            .enumerate()
            .filter(|(_, c)| &c.owner == owner)
            .map(|(i, c)| (i, &c.chat))
            .collect();
        owned.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then(b.0.cmp(&a.0)));
        owned.into_iter().map(|(_, c)| c.clone()).collect()
    }
}

impl ChatRepository for MemoryChats {
    async fn list_summaries(&self, owner: &UserId) -> Result<Vec<ChatSummary>, RepositoryError> {
        let state = self.0.state.lock().unwrap();
        Ok(state
            .chats
            .iter()
            .filter(|c| &c.owner == owner)
            .map(|c| ChatSummary {
                id: c.chat.id.clone(),
                title: c.chat.title.clone(),
                timestamp: c.chat.timestamp,
                preview: c.chat.preview.clone(),
            })
            .collect())
    }

    async fn list_with_messages(&self, owner: &UserId) -> Result<Vec<FullChat>, RepositoryError> {
        let state = self.0.state.lock().unwrap();
        Ok(Self::sorted(&state, owner))
    }

    async fn get(&self, owner: &UserId, id: &ChatId) -> Result<Option<FullChat>, RepositoryError> {
        let state = self.0.state.lock().unwrap();
        Ok(state
            .chats
            .iter()
            .find(|c| &c.owner == owner && &c.chat.id == id)
            .map(|c| c.chat.clone()))
    }

    async fn save(&self, owner: &UserId, write: &ChatWrite) -> Result<(), RepositoryError> {
        let mut state = self.0.state.lock().unwrap();
        let mut messages = Vec::with_capacity(write.messages.len());
        for m in &write.messages {
            state.next_message_id += 1;
            messages.push(Message {
                id: state.next_message_id,
                sender: m.sender,
                content: m.content.clone(),
                timestamp: m.timestamp,
            });
        }
        let chat = FullChat {
            id: write.id.clone(),
            title: write.title.clone(),
            timestamp: write.timestamp,
            preview: write.preview.clone(),
            messages,
        };

        match state.chats.iter_mut().find(|c| c.chat.id == write.id) {
            Some(existing) if &existing.owner != owner => {
                Err(RepositoryError::Conflict(write.id.to_string()))
            }
            Some(existing) => {
                existing.chat = chat;
                Ok(())
            }
            None => {
                state.chats.push(StoredChat { owner: *owner, chat });
                Ok(())
            }
        }
    }

    async fn delete(&self, owner: &UserId, id: &ChatId) -> Result<bool, RepositoryError> {
        self.0.check_chat_deletes(owner)?;
        let mut state = self.0.state.lock().unwrap();
        let before = state.chats.len();
        state.chats.retain(|c| !(&c.owner == owner && &c.chat.id == id));
        Ok(state.chats.len() != before)
    }

    async fn delete_all(&self, owner: &UserId) -> Result<u64, RepositoryError> {
        self.0.check_chat_deletes(owner)?;
        let mut state = self.0.state.lock().unwrap();
        let before = state.chats.len();
        state.chats.retain(|c| &c.owner != owner);
        Ok((before - state.chats.len()) as u64)
    }

    async fn list_ids_newest_first(&self, owner: &UserId) -> Result<Vec<ChatId>, RepositoryError> {
        let state = self.0.state.lock().unwrap();
        Ok(Self::sorted(&state, owner).into_iter().map(|c| c.id).collect())
    }

    async fn delete_many(&self, owner: &UserId, ids: &[ChatId]) -> Result<u64, RepositoryError> {
        self.0.check_chat_deletes(owner)?;
        let mut state = self.0.state.lock().unwrap();
        let before = state.chats.len();
        state
            .chats
            .retain(|c| !(&c.owner == owner && ids.contains(&c.chat.id)));
        Ok((before - state.chats.len()) as u64)
    }

    async fn delete_older_than(&self, owner: &UserId, cutoff_ms: i64) -> Result<u64, RepositoryError> {
        self.0.check_chat_deletes(owner)?;
        let mut state = self.0.state.lock().unwrap();
        let before = state.chats.len();
        state
            .chats
            .retain(|c| !(&c.owner == owner && c.chat.timestamp < cutoff_ms));
        Ok((before - state.chats.len()) as u64)
    }
}

/// A registered user id with no credentials, for chat and retention tests.
pub fn seed_user(store: &MemoryStore, username: &str) -> UserId {
    let user = User {
        id: UserId::new(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: format!("plain:{username}-pw"),
        created_at: Utc::now(),
        last_login: None,
    };
    store.state.lock().unwrap().users.insert(user.id, user.clone());
    user.id
}
