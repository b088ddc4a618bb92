//! Settings repository trait definition.

use chatkeep_types::error::RepositoryError;
use chatkeep_types::settings::Settings;
use chatkeep_types::user::UserId;

/// Repository trait for per-user key/value settings.
pub trait SettingsRepository: Send + Sync {
    /// All settings for a user. Empty when the user has none.
    fn get_all(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Settings, RepositoryError>> + Send;

    fn get(
        &self,
        user_id: &UserId,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Insert or overwrite every pair in one transaction.
    fn upsert(
        &self,
        user_id: &UserId,
        values: &Settings,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Every (user, value) pair stored under `key`, across all users.
    fn list_by_key(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Vec<(UserId, String)>, RepositoryError>> + Send;
}
