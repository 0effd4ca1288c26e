use super::*;
use crate::cli::settings::SettingHandler;
use crate::core::lang::Lang;
use crate::core::mask::{create_translate_mask, ARGUE_MASK_ID};
use crate::core::model_config::ServiceProvider;
use serde_json::Value;
use tempfile::TempDir;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }

    pub(super) fn store_args(dir: &TempDir, argv: &[&str]) -> Args {
        let config = dir.path().join("config.toml");
        let store = dir.path().join("masks.toml");
        let mut full = vec![
            "chatmask",
            "--config",
            config.to_str().expect("utf-8 path"),
            "--store",
            store.to_str().expect("utf-8 path"),
        ];
        full.extend_from_slice(argv);
        parse_args(&full)
    }

    pub(super) fn open(dir: &TempDir) -> MaskStore {
        MaskStore::open(dir.path().join("masks.toml"), AppConfig::default())
            .expect("store should open")
    }
}

use test_helpers::{open, parse_args, store_args};

#[test]
fn defaults_to_listing() {
    let args = parse_args(&["chatmask"]);
    assert!(args.command.is_none());
    assert!(!args.verbose);
}

#[test]
fn global_flags_parse_after_subcommand() {
    let args = parse_args(&["chatmask", "list", "-v", "--store", "/tmp/masks.toml"]);
    assert!(args.verbose);
    assert_eq!(args.store, Some(PathBuf::from("/tmp/masks.toml")));
    assert!(matches!(args.command, Some(Commands::List)));
}

#[test]
fn create_accepts_repeated_context() {
    let args = parse_args(&[
        "chatmask",
        "create",
        "--name",
        "Reviewer",
        "--context",
        "system:Review code.",
        "--context",
        "user:Be strict",
    ]);
    match args.command {
        Some(Commands::Create { name, context, .. }) => {
            assert_eq!(name.as_deref(), Some("Reviewer"));
            assert_eq!(context.len(), 2);
        }
        _ => panic!("expected create subcommand"),
    }
}

#[test]
fn lang_parses_codes_and_rejects_unknown() {
    match parse_args(&["chatmask", "lang", "JP"]).command {
        Some(Commands::Lang { lang, clear }) => {
            assert_eq!(lang, Some(Lang::Jp));
            assert!(!clear);
        }
        _ => panic!("expected lang subcommand"),
    }
    assert!(Args::try_parse_from(["chatmask", "lang", "xx"]).is_err());
    assert!(Args::try_parse_from(["chatmask", "lang", "en", "--clear"]).is_err());
}

#[test]
fn context_entries_split_on_first_colon() {
    let message = parse_context_entry("System: time is 12:00").expect("valid entry");
    assert_eq!(message.role, Role::System);
    assert_eq!(message.content, "time is 12:00");

    assert!(parse_context_entry("no separator").is_err());
    assert!(parse_context_entry("narrator:hello").is_err());
}

#[test]
fn create_then_rename_then_delete_persists() {
    let dir = TempDir::new().expect("temp dir");

    run(store_args(&dir, &["create", "--name", "Draft", "--model", "gpt-4.1"]))
        .expect("create should succeed");
    let store = open(&dir);
    let created = store.search("").pop().expect("one mask");
    assert_eq!(created.name, "Draft");
    assert_eq!(created.sync_global_config, Some(false));
    assert_eq!(created.model_config.model, "gpt-4.1");
    let id = created.id.clone();

    run(store_args(&dir, &["rename", id.as_str(), "Final", "Copy"]))
        .expect("rename should succeed");
    assert_eq!(
        open(&dir).get(Some(id.as_str())).map(|mask| mask.name.clone()),
        Some("Final Copy".to_string())
    );

    run(store_args(&dir, &["delete", id.as_str()])).expect("delete should succeed");
    assert!(open(&dir).is_empty());
}

#[test]
fn missing_masks_are_errors() {
    let dir = TempDir::new().expect("temp dir");
    assert!(run(store_args(&dir, &["rename", "nope", "x"])).is_err());
    assert!(run(store_args(&dir, &["delete", "nope"])).is_err());
    assert!(run(store_args(&dir, &["show", "nope"])).is_err());
}

#[test]
fn listing_a_fresh_store_does_not_create_the_file() {
    let dir = TempDir::new().expect("temp dir");
    run(store_args(&dir, &[])).expect("list should succeed");
    run(store_args(&dir, &["search"])).expect("search should succeed");
    run(store_args(&dir, &["lang"])).expect("lang should succeed");

    assert!(!dir.path().join("masks.toml").exists());
    let store = open(&dir);
    assert!(store.is_empty());
    assert!(store.get(Some(DEFAULT_MASK_ID)).is_none());
}

#[test]
fn mutating_commands_create_the_store_file() {
    let dir = TempDir::new().expect("temp dir");
    run(store_args(&dir, &["create", "--name", "Draft"])).expect("create should succeed");
    assert!(dir.path().join("masks.toml").exists());
}

#[test]
fn user_list_skips_stored_builtin_copies() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("masks.toml"),
        "version = 3.1\n\n[state.masks.keep]\nid = \"keep\"\nname = \"Kept\"\n",
    )
    .expect("write legacy store");

    let store = open(&dir);
    assert!(store.get(Some(DEFAULT_MASK_ID)).is_some());

    let listed: Vec<String> = user_masks(&store).into_iter().map(|mask| mask.id).collect();
    assert_eq!(listed, vec!["keep".to_string()]);
}

#[test]
fn default_mask_delete_is_refused_without_error() {
    let dir = TempDir::new().expect("temp dir");
    run(store_args(&dir, &["delete", DEFAULT_MASK_ID])).expect("refusal is not an error");
}

#[test]
fn lang_command_updates_store() {
    let dir = TempDir::new().expect("temp dir");
    run(store_args(&dir, &["lang", "fr"])).expect("set lang");
    assert_eq!(open(&dir).language(), Some(Lang::Fr));

    run(store_args(&dir, &["lang", "--clear"])).expect("clear lang");
    assert_eq!(open(&dir).language(), None);
}

#[test]
fn preview_routes_builtin_presets_to_their_backend() {
    let global = ModelConfig::default();
    let mask = create_translate_mask(Lang::En);

    let (url, body) =
        preview_request(&mask, &global, "bonjour", "s-1", "", false).expect("preview");
    assert_eq!(url, "http://localhost:8088/api/v/translate");

    let body: Value = serde_json::from_str(&body).expect("json body");
    let marker: Value =
        serde_json::from_str(body["model"].as_str().expect("model string")).expect("marker");
    assert_eq!(marker["sessionid"], "s-1");
    assert_eq!(marker["maskname"], "translate");
}

#[test]
fn preview_uses_provider_path_for_plain_masks() {
    let global = ModelConfig::default();
    let mut mask = create_translate_mask(Lang::En);
    mask.id = ARGUE_MASK_ID.to_string();
    mask.bend_url.clear();

    let (url, body) = preview_request(&mask, &global, "hi", "s-1", "https://api.x.ai/", true)
        .expect("preview");
    assert_eq!(url, "https://api.x.ai/v1/chat/completions");

    let body: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(body["model"], "grok-3-fast");
    assert_eq!(body["stream"], true);
}

#[test]
fn model_settings_round_trip_through_config_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();
    let config = AppConfig::default();
    let ctx = SetContext {
        config_path: &config_path,
        config: &config,
    };

    let handler = registry.get("provider").expect("provider handler");
    let message = handler
        .set(&["deepseek".to_string()], &ctx)
        .expect("known provider");
    assert!(message.contains("DeepSeek"));

    registry
        .get("temperature")
        .expect("temperature handler")
        .set(&["0.9".to_string()], &ctx)
        .expect("valid temperature");

    let saved = AppConfig::load_from_path(&config_path).expect("load");
    assert_eq!(saved.model_config.provider_name, ServiceProvider::DeepSeek);
    assert_eq!(saved.model_config.temperature, 0.9);

    handler.unset(&ctx).expect("unset provider");
    let saved = AppConfig::load_from_path(&config_path).expect("load");
    assert_eq!(saved.model_config.provider_name, ServiceProvider::OpenAI);
    assert_eq!(saved.model_config.temperature, 0.9);
}

#[test]
fn invalid_setting_values_leave_file_untouched() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    let registry = SettingRegistry::new();
    let config = AppConfig::default();
    let ctx = SetContext {
        config_path: &config_path,
        config: &config,
    };

    let cases = [
        ("temperature", "hot"),
        ("temperature", "3.5"),
        ("top-p", "-0.1"),
        ("max-tokens", "many"),
        ("send-memory", "maybe"),
        ("provider", "openrouter"),
        ("lang", "klingon"),
    ];
    for (key, value) in cases {
        let handler = registry.get(key).expect("registered key");
        assert!(
            handler.set(&[value.to_string()], &ctx).is_err(),
            "{key}={value} should be rejected"
        );
    }
    assert!(!config_path.exists());
}

#[test]
fn model_setting_updates_compress_threshold() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    let config = AppConfig::default();
    let ctx = SetContext {
        config_path: &config_path,
        config: &config,
    };

    SettingRegistry::new()
        .get("model")
        .expect("model handler")
        .set(&["claude-3-opus".to_string()], &ctx)
        .expect("set model");

    let saved = AppConfig::load_from_path(&config_path).expect("load");
    assert_eq!(saved.model_config.model, "claude-3-opus");
    assert_eq!(saved.model_config.compress_message_length_threshold, 200_000);
}

#[test]
fn every_registered_key_formats_its_value() {
    let registry = SettingRegistry::new();
    let config = AppConfig {
        lang: Some(Lang::Cn),
        ..AppConfig::default()
    };
    for key in registry.keys_display_order() {
        let line = registry.get(key).expect("registered").format(&config);
        assert!(line.starts_with(&format!("  {key}:")), "{line}");
    }
    assert_eq!(
        registry.get("lang").expect("lang").format(&config),
        "  lang: cn"
    );
}
