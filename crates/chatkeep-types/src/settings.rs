//! Per-user key/value settings.
//!
//! Settings are free-form string pairs, unique per (user, key). Two reserved
//! keys drive chat retention: [`STORAGE_LIMIT_KEY`] and [`AUTO_CLEAR_KEY`].

use std::collections::BTreeMap;

/// Maximum number of chats a user keeps. `<= 0` or absent means unlimited.
pub const STORAGE_LIMIT_KEY: &str = "storageLimit";

/// Maximum chat age in days. `<= 0` or absent disables auto-clear.
pub const AUTO_CLEAR_KEY: &str = "autoClear";

pub const DEFAULT_STORAGE_LIMIT: i64 = 10;
pub const DEFAULT_AUTO_CLEAR_DAYS: i64 = 30;

pub const MAX_SETTING_KEY_LEN: usize = 50;
pub const MAX_SETTING_VALUE_LEN: usize = 200;

/// A user's settings, keyed by setting name.
pub type Settings = BTreeMap<String, String>;

/// Settings seeded for every newly registered user.
pub fn default_settings(storage_limit: i64, auto_clear_days: i64) -> Settings {
    let mut settings = Settings::new();
    settings.insert(STORAGE_LIMIT_KEY.to_string(), storage_limit.to_string());
    settings.insert(AUTO_CLEAR_KEY.to_string(), auto_clear_days.to_string());
    settings
}

/// Interpretation of a retention setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionValue {
    /// A positive integer threshold.
    Enabled(i64),
    /// Zero or negative: the policy is switched off.
    Disabled,
    /// Not an integer at all.
    Invalid(String),
}

impl RetentionValue {
    /// Parse a raw setting value. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(n) if n > 0 => RetentionValue::Enabled(n),
            Ok(_) => RetentionValue::Disabled,
            Err(_) => RetentionValue::Invalid(raw.to_string()),
        }
    }
}
