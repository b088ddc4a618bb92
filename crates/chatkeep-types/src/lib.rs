//! Shared domain types for chatkeep.
//!
//! Users, chats with their messages, per-user settings, server configuration,
//! and the error enums shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod settings;
pub mod user;
