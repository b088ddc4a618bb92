//! Credential store: registration, credential checks, and profile lookup.
//!
//! Registration seeds the user's default retention settings in the same
//! write as the user row, so a user never exists without them.

use chatkeep_types::error::AuthError;
use chatkeep_types::settings::Settings;
use chatkeep_types::user::{RegisterRequest, User, UserId, UserProfile};

use crate::repository::user::UserRepository;
use crate::service::clock::SharedClock;
use crate::service::credential::CredentialHasher;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 30;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Service owning users and their credentials.
pub struct AuthService<U: UserRepository, H: CredentialHasher> {
    users: U,
    hasher: H,
    clock: SharedClock,
    /// Settings written for every new user.
    defaults: Settings,
}

impl<U: UserRepository, H: CredentialHasher> AuthService<U, H> {
    pub fn new(users: U, hasher: H, clock: SharedClock, defaults: Settings) -> Self {
        Self {
            users,
            hasher,
            clock,
            defaults,
        }
    }

    /// Create a user with default settings.
    ///
    /// Username and email are trimmed; the password is taken as given.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserId, AuthError> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();
        validate_registration(&username, &email, &request.password)?;

        if self.users.get_by_username(&username).await?.is_some() {
            return Err(AuthError::Conflict("username".to_string()));
        }
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict("email".to_string()));
        }

        let password_hash = self
            .hasher
            .hash_password(&request.password)
            .map_err(AuthError::Crypto)?;

        let user = User {
            id: UserId::new(),
            username,
            email,
            password_hash,
            created_at: self.clock.now(),
            last_login: None,
        };

        // The pre-checks above are racy; the store's unique constraints decide.
        let user = self.users.create(&user, &self.defaults).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user.id)
    }

    /// Check a username/password pair and record the login.
    ///
    /// Unknown usernames and wrong passwords both yield `Unauthorized`.
    pub async fn verify(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }

        let Some(user) = self.users.get_by_username(username).await? else {
            tracing::debug!(username, "login for unknown username");
            return Err(AuthError::Unauthorized);
        };
        if !self.hasher.verify_password(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::Unauthorized);
        }

        self.users.record_login(&user.id, self.clock.now()).await?;
        Ok(user.id)
    }

    /// Public profile of an existing user.
    pub async fn profile(&self, user_id: &UserId) -> Result<UserProfile, AuthError> {
        match self.users.get_by_id(user_id).await? {
            Some(user) => Ok(UserProfile::from(&user)),
            None => Err(AuthError::Unauthorized),
        }
    }
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), AuthError> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::InvalidInput(
            "username, email and password are required".to_string(),
        ));
    }

    let len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(AuthError::InvalidInput(format!(
            "username must be {MIN_USERNAME_LEN}-{MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AuthError::InvalidInput(
            "username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }

    if !is_plausible_email(email) {
        return Err(AuthError::InvalidInput("email address is not valid".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
