//! SQLite user repository implementation.

use chatkeep_core::repository::user::UserRepository;
use chatkeep_types::error::RepositoryError;
use chatkeep_types::settings::Settings;
use chatkeep_types::user::{User, UserId};
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;
use super::query_error;

/// SQLite-backed implementation of [`UserRepository`].
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    created_at: String,
    last_login: Option<String>,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
            last_login: row.try_get("last_login")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id: UserId = self
            .id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: parse_datetime(&self.created_at)?,
            last_login: self.last_login.as_deref().map(parse_datetime).transpose()?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Map a failed user insert to the column that made it conflict.
fn insert_error(e: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let column = if db_err.message().contains("users.email") {
                "email"
            } else {
                "username"
            };
            return RepositoryError::Conflict(column.to_string());
        }
    }
    query_error(e)
}

impl SqliteUserRepository {
    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT * FROM users WHERE {column} = ?");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let user_row = UserRow::from_row(&row).map_err(query_error)?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// UserRepository implementation
// ---------------------------------------------------------------------------

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User, initial: &Settings) -> Result<User, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at, last_login)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(format_datetime(&user.created_at))
        .bind(user.last_login.as_ref().map(format_datetime))
        .execute(&mut *tx)
        .await
        .map_err(insert_error)?;

        for (key, value) in initial {
            sqlx::query("INSERT INTO settings (user_id, key, value) VALUES (?, ?, ?)")
                .bind(user.id.to_string())
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
        }

        tx.commit().await.map_err(query_error)?;
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_by("id", &id.to_string()).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_by("username", username).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_by("email", email).await
    }

    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(format_datetime(&at))
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
