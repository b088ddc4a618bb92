//! HS256 session tokens (compact JWT form).
//!
//! A token is `base64url(header).base64url(claims).base64url(signature)` where
//! the signature is HMAC-SHA256 over the first two segments. Only the
//! `HS256` algorithm is accepted when decoding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use chatkeep_core::service::token::TokenCodec;
use chatkeep_types::user::SessionClaims;

type HmacSha256 = Hmac<Sha256>;

/// Length of generated secrets, in bytes.
pub const GENERATED_SECRET_LEN: usize = 32;

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// HMAC-SHA256 implementation of [`TokenCodec`].
#[derive(Clone)]
pub struct HmacTokenCodec {
    secret: Vec<u8>,
}

impl HmacTokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// A codec keyed with fresh random bytes. Its tokens die with the process.
    pub fn with_random_secret() -> Self {
        let mut secret = vec![0u8; GENERATED_SECRET_LEN];
        rand::rng().fill_bytes(&mut secret);
        Self { secret }
    }

    /// Use the configured secret, or a random one (with a warning) if none is set.
    pub fn from_config(secret: Option<&str>) -> Self {
        match secret.map(str::trim).filter(|s| !s.is_empty()) {
            Some(secret) => Self::new(secret.as_bytes()),
            None => {
                tracing::warn!(
                    "no token secret configured; using a random key, sessions will not survive a restart"
                );
                Self::with_random_secret()
            }
        }
    }

    fn mac(&self) -> Result<HmacSha256, String> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| e.to_string())
    }
}

impl TokenCodec for HmacTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String, String> {
        let header = Header {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let header = serde_json::to_vec(&header).map_err(|e| e.to_string())?;
        let payload = serde_json::to_vec(claims).map_err(|e| e.to_string())?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    fn decode(&self, token: &str) -> Option<SessionClaims> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature_b64) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
        let mut mac = self.mac().ok()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let header: Header = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_b64).ok()?).ok()?;
        if header.alg != "HS256" {
            return None;
        }

        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload_b64).ok()?).ok()
    }
}
