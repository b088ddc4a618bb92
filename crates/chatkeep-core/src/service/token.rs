//! TokenCodec trait for signing and checking session tokens.
//!
//! The codec only deals with the signature and the wire format. Expiry and
//! subject checks belong to [`SessionIssuer`](super::session::SessionIssuer).

use chatkeep_types::user::SessionClaims;

/// Signs claims into an opaque token string and recovers them again.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &SessionClaims) -> Result<String, String>;

    /// Recover the claims of a correctly signed token.
    ///
    /// Returns `None` for anything malformed or carrying a bad signature;
    /// never panics on hostile input.
    fn decode(&self, token: &str) -> Option<SessionClaims>;
}
