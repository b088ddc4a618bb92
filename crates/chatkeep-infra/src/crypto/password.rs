//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`), so the salt and cost
//! parameters travel with each hash and verification needs nothing else.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;

use chatkeep_core::service::credential::CredentialHasher;

const SALT_LEN: usize = 16;

/// Argon2id implementation of [`CredentialHasher`] with the crate's default
/// (OWASP) parameters.
#[derive(Clone, Default)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
}

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash_password(&self, password: &str) -> Result<String, String> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| e.to_string())?;

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| e.to_string())
    }

    fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };
        // Constant-time comparison happens inside `verify_password`.
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
