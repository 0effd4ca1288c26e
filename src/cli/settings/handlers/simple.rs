//! Simple setting handlers for top-level config values.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{mutate_config, success_set, success_unset};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::{path_display, AppConfig};
use crate::core::lang::Lang;
use std::path::PathBuf;

/// Handler for the `lang` setting.
pub struct LangHandler;

impl SettingHandler for LangHandler {
    fn key(&self) -> &'static str {
        "lang"
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set the language, specify a language code:",
                example: "chatmask set lang cn",
            });
        }

        let input = args.join(" ");
        let lang: Lang = input.parse().map_err(|_| SettingError::InvalidValue {
            key: "lang",
            input: input.clone(),
            expected: "one of cn, en, tw, jp, ko, fr, de, es, it, ru",
        })?;

        mutate_config(ctx.config_path, move |config| config.lang = Some(lang))?;
        Ok(success_set("lang", lang.code()))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(ctx.config_path, |config| config.lang = None)?;
        Ok(success_unset("lang", "detected from locale"))
    }

    fn format(&self, config: &AppConfig) -> String {
        match config.lang {
            Some(lang) => format!("  lang: {lang}"),
            None => format!("  lang: (unset, detected {})", config.lang()),
        }
    }
}

/// Handler for the `store-path` setting.
pub struct StorePathHandler;

impl SettingHandler for StorePathHandler {
    fn key(&self) -> &'static str {
        "store-path"
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To move the mask store, specify a file path:",
                example: "chatmask set store-path ~/masks.toml",
            });
        }

        let path = PathBuf::from(args.join(" "));
        let message = success_set("store-path", &path_display(&path));
        mutate_config(ctx.config_path, move |config| config.store_path = Some(path))?;
        Ok(message)
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(ctx.config_path, |config| config.store_path = None)?;
        Ok(success_unset("store-path", "platform data directory"))
    }

    fn format(&self, config: &AppConfig) -> String {
        match (&config.store_path, config.resolved_store_path()) {
            (Some(path), _) => format!("  store-path: {}", path_display(path)),
            (None, Some(path)) => format!("  store-path: (default) {}", path_display(path)),
            (None, None) => "  store-path: (unavailable)".to_string(),
        }
    }
}
