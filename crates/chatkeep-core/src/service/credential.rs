//! CredentialHasher trait for one-way password hashing.
//!
//! Defined in chatkeep-core so the credential store can hash and verify
//! passwords without coupling to a specific algorithm. The Argon2id adapter
//! lives in chatkeep-infra.

/// One-way password hash with constant-time verification.
pub trait CredentialHasher: Send + Sync {
    /// Hash a password into a self-describing string (salt and parameters included).
    fn hash_password(&self, password: &str) -> Result<String, String>;

    /// Check a password against a stored hash. A malformed hash never verifies.
    fn verify_password(&self, password: &str, stored_hash: &str) -> bool;
}
