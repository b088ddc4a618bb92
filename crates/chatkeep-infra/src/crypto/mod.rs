//! Cryptographic operations for chatkeep.
//!
//! - `password`: Argon2id password hashing behind `CredentialHasher`
//! - `token`: HS256 session tokens behind `TokenCodec`

pub mod password;
pub mod token;
