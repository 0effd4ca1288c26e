//! Settings management for CLI set/unset commands.
//!
//! Each configuration key is served by a [`SettingHandler`]:
//!
//! - Simple settings (`lang`, `store-path`)
//! - Model settings that edit the global model config (`model`, `temperature`, `send-memory`, ...)

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::AppConfig;
use std::path::Path;

/// Context provided to setting handlers during set/unset operations.
pub struct SetContext<'a> {
    /// Config file the change is written to.
    pub config_path: &'a Path,
    /// Snapshot loaded before the command ran.
    pub config: &'a AppConfig,
}

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the configuration value from the arguments after the key.
    ///
    /// Returns a success message to display.
    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Restore the default value.
    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Format the current value for display in `chatmask set` output.
    fn format(&self, config: &AppConfig) -> String;
}
