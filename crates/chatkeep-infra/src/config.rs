//! Server configuration loader for chatkeep.
//!
//! Reads `config.toml` from the data directory (`~/.chatkeep/` by default),
//! then applies `CHATKEEP_*` environment overrides. A missing or malformed
//! file falls back to defaults.

use std::path::{Path, PathBuf};

use chatkeep_types::config::ServerConfig;

use crate::sqlite::pool::default_database_url;

pub const DATA_DIR_ENV: &str = "CHATKEEP_DATA_DIR";
pub const BIND_ENV: &str = "CHATKEEP_BIND";
pub const DATABASE_URL_ENV: &str = "CHATKEEP_DATABASE_URL";
pub const SECRET_KEY_ENV: &str = "CHATKEEP_SECRET_KEY";
pub const LOG_JSON_ENV: &str = "CHATKEEP_LOG_JSON";

/// Resolve the data directory.
///
/// Priority:
/// 1. `CHATKEEP_DATA_DIR` environment variable
/// 2. `~/.chatkeep`
/// 3. `./.chatkeep` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".chatkeep");
    }
    PathBuf::from(".chatkeep")
}

/// Load `{data_dir}/config.toml` and apply environment overrides.
pub async fn load_server_config(data_dir: &Path) -> ServerConfig {
    let config = read_config_file(data_dir).await;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

async fn read_config_file(data_dir: &Path) -> ServerConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", config_path.display());
            ServerConfig::default()
        }
    }
}

/// Overlay environment values onto `config`. `lookup` stands in for `std::env::var`.
pub fn apply_env_overrides(
    mut config: ServerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ServerConfig {
    if let Some(bind) = lookup(BIND_ENV) {
        config.bind_address = bind;
    }
    if let Some(url) = lookup(DATABASE_URL_ENV) {
        config.database_url = Some(url);
    }
    if let Some(secret) = lookup(SECRET_KEY_ENV) {
        config.token_secret = Some(secret);
    }
    if let Some(raw) = lookup(LOG_JSON_ENV) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => config.log_json = true,
            "0" | "false" | "no" => config.log_json = false,
            _ => tracing::warn!(value = %raw, "ignoring unrecognized {LOG_JSON_ENV}"),
        }
    }
    config
}

/// The configured database URL, or the default file inside `data_dir`.
pub fn resolve_database_url(config: &ServerConfig, data_dir: &Path) -> String {
    config
        .database_url
        .clone()
        .unwrap_or_else(|| default_database_url(data_dir))
}
