use super::data::{path_display, AppConfig};
use super::io::ConfigError;
use crate::core::lang::Lang;
use crate::core::model_config::{ModelConfig, ServiceProvider};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = AppConfig::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, AppConfig::default());
    assert!(!config_path.exists());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = AppConfig {
        lang: Some(Lang::Tw),
        store_path: Some(PathBuf::from("/var/lib/chatmask/masks.toml")),
        model_config: ModelConfig {
            model: "deepseek-chat".to_string(),
            provider_name: ServiceProvider::DeepSeek,
            ..ModelConfig::default()
        },
    };
    config.save_to_path(&config_path).expect("Failed to save config");

    let loaded = AppConfig::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);

    let mut cleared = loaded;
    cleared.lang = None;
    cleared.store_path = None;
    cleared.save_to_path(&config_path).expect("Failed to save config");

    let reloaded = AppConfig::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.lang, None);
    assert_eq!(reloaded.store_path, None);
    assert_eq!(reloaded.model_config.model, "deepseek-chat");
}

#[test]
fn test_partial_model_config_uses_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
lang = "jp"

[model_config]
model = "gpt-4.1"
temperature = 0.2
"#,
    )
    .expect("Failed to write config");

    let config = AppConfig::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config.lang, Some(Lang::Jp));
    assert_eq!(config.model_config.model, "gpt-4.1");
    assert_eq!(config.model_config.temperature, 0.2);
    assert_eq!(
        config.model_config.max_tokens,
        ModelConfig::default().max_tokens
    );
    assert!(config.model_config.send_memory);
}

#[test]
fn test_parse_error_names_the_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "lang = [unterminated").expect("Failed to write config");

    let err = AppConfig::load_from_path(&config_path).expect_err("invalid TOML should fail");

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("Failed to parse config"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_unknown_lang_is_a_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "lang = \"xx\"\n").expect("Failed to write config");

    assert!(matches!(
        AppConfig::load_from_path(&config_path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_mutate_saves_changes() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");

    let previous = AppConfig::mutate(&config_path, |config| {
        let previous = config.model_config.history_message_count;
        config.model_config.history_message_count = 12;
        Ok(previous)
    })
    .expect("mutate failed");
    assert_eq!(previous, 4);

    let persisted = AppConfig::load_from_path(&config_path).expect("load failed");
    assert_eq!(persisted.model_config.history_message_count, 12);
}

#[test]
fn test_mutate_error_leaves_file_unchanged() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");

    let result: Result<(), _> = AppConfig::mutate(&config_path, |config| {
        config.lang = Some(Lang::Ru);
        Err("rejected".into())
    });

    assert!(result.is_err());
    assert!(!config_path.exists());
}

#[test]
fn test_store_path_override() {
    let config = AppConfig {
        store_path: Some(PathBuf::from("/tmp/custom-masks.toml")),
        ..AppConfig::default()
    };
    assert_eq!(
        config.resolved_store_path(),
        Some(PathBuf::from("/tmp/custom-masks.toml"))
    );

    if let Some(default) = AppConfig::default().resolved_store_path() {
        assert!(default.ends_with("mask-store.toml"));
    }
}

#[test]
fn test_lang_falls_back_to_detection() {
    let pinned = AppConfig {
        lang: Some(Lang::De),
        ..AppConfig::default()
    };
    assert_eq!(pinned.lang(), Lang::De);
    assert_eq!(AppConfig::default().lang(), Lang::detect());
}

#[cfg(unix)]
#[test]
fn test_path_display_outside_home() {
    assert_eq!(path_display("/etc/chatmask.toml"), "/etc/chatmask.toml");
}

#[test]
fn test_save_replaces_file_without_leftovers() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");

    for lang in [Lang::En, Lang::Ko] {
        AppConfig {
            lang: Some(lang),
            ..AppConfig::default()
        }
        .save_to_path(&config_path)
        .expect("Failed to save config");
    }

    let entries: Vec<_> = fs::read_dir(temp_dir.path())
        .expect("Failed to list directory")
        .map(|entry| entry.expect("dir entry").file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("config.toml")]);
    let loaded = AppConfig::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.lang, Some(Lang::Ko));
}
