//! Infrastructure layer for chatkeep.
//!
//! Implements the ports defined in `chatkeep-core`: SQLite repositories,
//! Argon2id password hashing, and HMAC-signed session tokens. Also loads the
//! server configuration.

pub mod config;
pub mod crypto;
pub mod sqlite;
