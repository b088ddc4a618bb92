//! Session issuer: stateless signed tokens bound to a user id.
//!
//! Tokens are not stored server-side. A token is valid while its signature
//! checks out, it has not expired, and its subject still exists.

use chatkeep_types::error::AuthError;
use chatkeep_types::user::{SessionClaims, UserId};
use chrono::Duration;

use crate::repository::user::UserRepository;
use crate::service::clock::SharedClock;
use crate::service::token::TokenCodec;

/// Lifetime of an issued token.
pub const SESSION_TTL: Duration = Duration::hours(24);

pub struct SessionIssuer<U: UserRepository, T: TokenCodec> {
    users: U,
    codec: T,
    clock: SharedClock,
}

impl<U: UserRepository, T: TokenCodec> SessionIssuer<U, T> {
    pub fn new(users: U, codec: T, clock: SharedClock) -> Self {
        Self {
            users,
            codec,
            clock,
        }
    }

    /// Sign a token for `user_id`, expiring [`SESSION_TTL`] from now.
    pub fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
        let now = self.clock.now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + SESSION_TTL).timestamp(),
        };
        self.codec.encode(&claims).map_err(AuthError::Crypto)
    }

    /// Resolve a token to the user it was issued for.
    ///
    /// Every rejection is `Unauthorized`; only a failing store lookup is
    /// reported as a storage error.
    pub async fn validate(&self, token: &str) -> Result<UserId, AuthError> {
        let Some(claims) = self.codec.decode(token.trim()) else {
            tracing::debug!("rejected token with bad format or signature");
            return Err(AuthError::Unauthorized);
        };

        if self.clock.now().timestamp() >= claims.exp {
            tracing::debug!(sub = %claims.sub, "rejected expired token");
            return Err(AuthError::Unauthorized);
        }

        let user_id: UserId = claims.sub.parse().map_err(|_| AuthError::Unauthorized)?;
        match self.users.get_by_id(&user_id).await? {
            Some(_) => Ok(user_id),
            None => {
                tracing::debug!(%user_id, "rejected token for unknown user");
                Err(AuthError::Unauthorized)
            }
        }
    }
}
