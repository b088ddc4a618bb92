//! SQLite settings repository implementation.

use chatkeep_core::repository::settings::SettingsRepository;
use chatkeep_types::error::RepositoryError;
use chatkeep_types::settings::Settings;
use chatkeep_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::query_error;

/// SQLite-backed implementation of [`SettingsRepository`].
#[derive(Clone)]
pub struct SqliteSettingsRepository {
    pool: DatabasePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl SettingsRepository for SqliteSettingsRepository {
    async fn get_all(&self, user_id: &UserId) -> Result<Settings, RepositoryError> {
        let rows = sqlx::query("SELECT key, value FROM settings WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut settings = Settings::new();
        for row in &rows {
            let key: String = row.try_get("key").map_err(query_error)?;
            let value: String = row.try_get("value").map_err(query_error)?;
            settings.insert(key, value);
        }
        Ok(settings)
    }

    async fn get(&self, user_id: &UserId, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM settings WHERE user_id = ? AND key = ?")
            .bind(user_id.to_string())
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|r| r.try_get::<String, _>("value"))
            .transpose()
            .map_err(query_error)
    }

    async fn upsert(&self, user_id: &UserId, values: &Settings) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        for (key, value) in values {
            sqlx::query(
                "INSERT INTO settings (user_id, key, value) VALUES (?, ?, ?)
                 ON CONFLICT (user_id, key) DO UPDATE SET value = excluded.value",
            )
            .bind(user_id.to_string())
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        // Dropping `tx` on an early return rolls back every pair.
        tx.commit().await.map_err(query_error)
    }

    async fn list_by_key(&self, key: &str) -> Result<Vec<(UserId, String)>, RepositoryError> {
        let rows = sqlx::query("SELECT user_id, value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let user_id: String = row.try_get("user_id").map_err(query_error)?;
            let user_id: UserId = user_id
                .parse()
                .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
            let value: String = row.try_get("value").map_err(query_error)?;
            entries.push((user_id, value));
        }
        Ok(entries)
    }
}
