//! Helper functions for settings operations.

use crate::core::config::AppConfig;
use crate::core::model_config::ServiceProvider;
use std::path::Path;

use super::error::SettingError;

/// Wrapper around `AppConfig::mutate` that maps errors to `SettingError::ConfigError`.
pub fn mutate_config<F>(config_path: &Path, f: F) -> Result<(), SettingError>
where
    F: FnOnce(&mut AppConfig),
{
    try_mutate_config(config_path, |config| {
        f(config);
        Ok(())
    })
}

/// Like [`mutate_config`], but a failing `f` leaves the file untouched and its
/// error is returned as-is.
pub fn try_mutate_config<F>(config_path: &Path, f: F) -> Result<(), SettingError>
where
    F: FnOnce(&mut AppConfig) -> Result<(), SettingError>,
{
    AppConfig::mutate(config_path, |config| f(config).map_err(Into::into)).map_err(|err| {
        match err.downcast::<SettingError>() {
            Ok(setting) => *setting,
            Err(other) => SettingError::ConfigError(other.to_string()),
        }
    })
}

pub fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

pub fn success_unset(key: &str, default: &str) -> String {
    format!("✅ Unset {key} (will use default: {default})")
}

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Format a boolean value for display.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

pub fn validate_provider(input: &str) -> Result<ServiceProvider, SettingError> {
    ServiceProvider::from_name(input).ok_or_else(|| SettingError::UnknownProvider {
        input: input.to_string(),
    })
}
