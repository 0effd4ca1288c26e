use crate::core::lang::Lang;
use crate::core::model_config::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Process-wide settings: the global model config masks copy from, the
/// preferred language, and where the mask store lives.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct AppConfig {
    /// UI language code (e.g., "en", "cn"); detected from the locale when unset
    pub lang: Option<Lang>,
    /// Override for the mask store file
    pub store_path: Option<PathBuf>,
    /// Global model configuration. Missing keys fall back to the built-in defaults.
    #[serde(default)]
    pub model_config: ModelConfig,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl AppConfig {
    pub fn lang(&self) -> Lang {
        self.lang.unwrap_or_else(Lang::detect)
    }

    /// Where the mask store is read from and flushed to.
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path.clone().or_else(Self::default_store_path)
    }
}
