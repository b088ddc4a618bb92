//! Settings store: per-user key/value configuration.

use chatkeep_types::error::SettingsError;
use chatkeep_types::settings::{MAX_SETTING_KEY_LEN, MAX_SETTING_VALUE_LEN, Settings};
use chatkeep_types::user::UserId;

use crate::repository::settings::SettingsRepository;

pub struct SettingsService<S: SettingsRepository> {
    repo: S,
}

impl<S: SettingsRepository> SettingsService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// All of a user's settings; empty if they have none.
    pub async fn get_all(&self, user_id: &UserId) -> Result<Settings, SettingsError> {
        Ok(self.repo.get_all(user_id).await?)
    }

    /// Insert or overwrite each pair. Either every pair is stored or none is.
    pub async fn upsert(&self, user_id: &UserId, values: Settings) -> Result<(), SettingsError> {
        for (key, value) in &values {
            validate_pair(key, value)?;
        }
        if values.is_empty() {
            return Ok(());
        }

        self.repo.upsert(user_id, &values).await?;
        tracing::debug!(%user_id, count = values.len(), "settings updated");
        Ok(())
    }
}

fn validate_pair(key: &str, value: &str) -> Result<(), SettingsError> {
    let key_len = key.chars().count();
    if key.trim().is_empty() || key_len > MAX_SETTING_KEY_LEN {
        return Err(SettingsError::InvalidInput(format!(
            "setting key must be 1-{MAX_SETTING_KEY_LEN} characters"
        )));
    }
    if value.chars().count() > MAX_SETTING_VALUE_LEN {
        return Err(SettingsError::InvalidInput(format!(
            "value of '{key}' exceeds {MAX_SETTING_VALUE_LEN} characters"
        )));
    }
    Ok(())
}
