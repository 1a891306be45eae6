//! Retention settings with layered sources.
//!
//! Loading flow:
//! 1. Start with compiled [`RetentionSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `NJ_EXPIRATION_*` environment overrides (highest priority)
//! 4. Validate; an unknown timezone is a configuration error
//!
//! `TEMP_CHAT_RETENTION_HOURS` is not applied here. It is read when the
//! retention period is resolved, see [`crate::retention::retention_hours`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::midnight::parse_timezone;
use crate::retention::ExpirationPolicy;

/// Env var naming the settings file.
pub const SETTINGS_PATH_ENV: &str = "NJ_RETENTION_SETTINGS";
/// Settings file used when [`SETTINGS_PATH_ENV`] is unset.
pub const DEFAULT_SETTINGS_FILE: &str = "nj-retention.json";

const MODE_ENV: &str = "NJ_EXPIRATION_MODE";
const TIMEZONE_ENV: &str = "NJ_EXPIRATION_TIMEZONE";

/// Interface options that affect temporary chats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceConfig {
    /// Retention period in hours. Kept as raw JSON so a non-numeric value
    /// can be reported and ignored instead of failing the whole file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_chat_retention: Option<Value>,
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetentionSettings {
    pub interface: InterfaceConfig,
    pub expiration: ExpirationPolicy,
}

impl RetentionSettings {
    /// Check values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTimezone`](crate::error::RetentionError::InvalidTimezone)
    /// if the expiration policy names an unknown timezone.
    pub fn validate(&self) -> Result<()> {
        if let ExpirationPolicy::NextLocalMidnight { timezone } = &self.expiration {
            parse_timezone(timezone)?;
        }
        Ok(())
    }
}

/// Resolve the settings file path.
pub fn settings_path() -> PathBuf {
    std::env::var(SETTINGS_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

/// Load settings from the default path with env overrides.
pub fn load_settings() -> Result<RetentionSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env overrides.
///
/// If the file does not exist, the defaults are used. If it contains
/// invalid JSON, an error is returned.
pub fn load_settings_from_path(path: &Path) -> Result<RetentionSettings> {
    load_settings_with_env(path, |key| std::env::var(key).ok())
}

/// Load settings, reading env overrides through `env`.
pub fn load_settings_with_env<F>(path: &Path, env: F) -> Result<RetentionSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(RetentionSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading retention settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "retention settings file not found, using defaults");
        defaults
    };

    let mut settings: RetentionSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `NJ_EXPIRATION_MODE` and `NJ_EXPIRATION_TIMEZONE`.
///
/// Unrecognized modes and unknown timezones are ignored with a warning.
/// A timezone override only applies in `nextLocalMidnight` mode.
pub fn apply_env_overrides<F>(settings: &mut RetentionSettings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(mode) = env(MODE_ENV) {
        match parse_mode(&mode) {
            Some(policy) if policy.mode() != settings.expiration.mode() => {
                settings.expiration = policy;
            }
            Some(_) => {}
            None => warn!(value = %mode, "ignoring unrecognized {MODE_ENV}"),
        }
    }

    if let Some(tz) = env(TIMEZONE_ENV) {
        let tz = tz.trim().to_string();
        if parse_timezone(&tz).is_err() {
            warn!(value = %tz, "ignoring invalid {TIMEZONE_ENV}");
        } else if let ExpirationPolicy::NextLocalMidnight { timezone } = &mut settings.expiration {
            *timezone = tz;
        } else {
            debug!("{TIMEZONE_ENV} set but expiration mode is rolling");
        }
    }
}

/// Parse an expiration mode name. Accepts the camelCase settings spelling
/// and kebab/snake variants, case-insensitively.
pub fn parse_mode(val: &str) -> Option<ExpirationPolicy> {
    match val.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
        "rolling" => Some(ExpirationPolicy::Rolling),
        "nextlocalmidnight" | "midnight" => Some(ExpirationPolicy::default()),
        _ => None,
    }
}
