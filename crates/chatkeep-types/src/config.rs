//! Server configuration types for chatkeep.
//!
//! `ServerConfig` represents the `config.toml` in the data directory. Every
//! field has a default so an empty (or missing) file yields a working server.

use serde::{Deserialize, Serialize};

use crate::settings::{DEFAULT_AUTO_CLEAR_DAYS, DEFAULT_STORAGE_LIMIT};

/// Top-level configuration for the chatkeep server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// sqlx connection string. Defaults to `chatkeep.db` inside the data dir.
    #[serde(default)]
    pub database_url: Option<String>,

    /// HMAC key for session tokens. Generated at startup when unset.
    #[serde(default)]
    pub token_secret: Option<String>,

    /// When the auto-clear sweep runs: a cron expression or a phrase such as
    /// `"hourly"` or `"every 15 minutes"`.
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,

    /// Run one sweep immediately when the server starts.
    #[serde(default = "default_true")]
    pub sweep_on_start: bool,

    /// `storageLimit` seeded for new users.
    #[serde(default = "default_storage_limit")]
    pub default_storage_limit: i64,

    /// `autoClear` (days) seeded for new users.
    #[serde(default = "default_auto_clear_days")]
    pub default_auto_clear_days: i64,

    /// Emit logs as newline-delimited JSON.
    #[serde(default)]
    pub log_json: bool,
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_sweep_schedule() -> String {
    "hourly".to_string()
}

fn default_true() -> bool {
    true
}

fn default_storage_limit() -> i64 {
    DEFAULT_STORAGE_LIMIT
}

fn default_auto_clear_days() -> i64 {
    DEFAULT_AUTO_CLEAR_DAYS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_url: None,
            token_secret: None,
            sweep_schedule: default_sweep_schedule(),
            sweep_on_start: true,
            default_storage_limit: default_storage_limit(),
            default_auto_clear_days: default_auto_clear_days(),
            log_json: false,
        }
    }
}
