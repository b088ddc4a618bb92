//! User repository trait definition.

use chatkeep_types::error::RepositoryError;
use chatkeep_types::settings::Settings;
use chatkeep_types::user::{User, UserId};
use chrono::{DateTime, Utc};

/// Repository trait for user persistence.
///
/// Implementations live in chatkeep-infra (e.g., SqliteUserRepository).
pub trait UserRepository: Send + Sync {
    /// Insert a user together with its initial settings, atomically.
    ///
    /// Returns `RepositoryError::Conflict("username" | "email")` when either
    /// unique column is already taken; nothing is written in that case.
    fn create(
        &self,
        user: &User,
        initial_settings: &Settings,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Set `last_login` for a user.
    fn record_login(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove a user along with their chats and settings.
    fn delete(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
