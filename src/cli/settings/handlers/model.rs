//! Data-driven handlers for fields of the global model config.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{
    format_bool, parse_bool, success_set, success_unset, try_mutate_config, validate_provider,
};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::AppConfig;
use crate::core::model_config::ModelConfig;

type ApplyFn = fn(&mut ModelConfig, &str) -> Result<(), SettingError>;

/// Handler for one field of `[model_config]`. Unset restores the field's default.
pub struct ModelFieldHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    get: fn(&ModelConfig) -> String,
    apply: ApplyFn,
}

impl SettingHandler for ModelFieldHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let input = args.join(" ");
        // Bad values are rejected before the file is touched.
        let mut preview = ctx.config.model_config.clone();
        (self.apply)(&mut preview, &input)?;
        let display = (self.get)(&preview);

        let apply = self.apply;
        try_mutate_config(ctx.config_path, |config| {
            apply(&mut config.model_config, &input)
        })?;

        Ok(success_set(self.key, &display))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let defaults = ModelConfig::default();
        let default_display = (self.get)(&defaults);
        let apply = self.apply;
        try_mutate_config(ctx.config_path, |config| {
            apply(&mut config.model_config, &default_display)
        })?;
        Ok(success_unset(self.key, &default_display))
    }

    fn format(&self, config: &AppConfig) -> String {
        format!("  {}: {}", self.key, (self.get)(&config.model_config))
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    expected: &'static str,
    input: &str,
) -> Result<T, SettingError> {
    input
        .trim()
        .parse()
        .map_err(|_| SettingError::InvalidValue {
            key,
            input: input.to_string(),
            expected,
        })
}

fn parse_unit_range(key: &'static str, max: f64, input: &str) -> Result<f64, SettingError> {
    let value: f64 = parse_number(key, "a number", input)?;
    if (0.0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SettingError::InvalidValue {
            key,
            input: input.to_string(),
            expected: "a number within the allowed range",
        })
    }
}

/// Create a handler for the `model` setting.
pub fn model_handler() -> ModelFieldHandler {
    ModelFieldHandler {
        key: "model",
        hint: "To set the default model, specify its name:",
        example: "chatmask set model gpt-4o",
        get: |c| c.model.clone(),
        apply: |c, v| {
            c.model = v.trim().to_string();
            c.compress_message_length_threshold =
                c.with_model_threshold().compress_message_length_threshold;
            Ok(())
        },
    }
}

/// Create a handler for the `provider` setting.
pub fn provider_handler() -> ModelFieldHandler {
    ModelFieldHandler {
        key: "provider",
        hint: "To set the provider, specify its name:",
        example: "chatmask set provider XAI",
        get: |c| c.provider_name.to_string(),
        apply: |c, v| {
            c.provider_name = validate_provider(v)?;
            Ok(())
        },
    }
}

/// Create a handler for the `temperature` setting.
pub fn temperature_handler() -> ModelFieldHandler {
    ModelFieldHandler {
        key: "temperature",
        hint: "To set the temperature, specify a value between 0 and 2:",
        example: "chatmask set temperature 0.7",
        get: |c| c.temperature.to_string(),
        apply: |c, v| {
            c.temperature = parse_unit_range("temperature", 2.0, v)?;
            Ok(())
        },
    }
}

/// Create a handler for the `top-p` setting.
pub fn top_p_handler() -> ModelFieldHandler {
    ModelFieldHandler {
        key: "top-p",
        hint: "To set top-p, specify a value between 0 and 1:",
        example: "chatmask set top-p 0.9",
        get: |c| c.top_p.to_string(),
        apply: |c, v| {
            c.top_p = parse_unit_range("top-p", 1.0, v)?;
            Ok(())
        },
    }
}

/// Create a handler for the `max-tokens` setting.
pub fn max_tokens_handler() -> ModelFieldHandler {
    ModelFieldHandler {
        key: "max-tokens",
        hint: "To set the response token limit, specify a number:",
        example: "chatmask set max-tokens 8000",
        get: |c| c.max_tokens.to_string(),
        apply: |c, v| {
            c.max_tokens = parse_number("max-tokens", "a positive integer", v)?;
            Ok(())
        },
    }
}

/// Create a handler for the `send-memory` setting.
pub fn send_memory_handler() -> ModelFieldHandler {
    ModelFieldHandler {
        key: "send-memory",
        hint: "To include chat history in requests, specify on or off:",
        example: "chatmask set send-memory off",
        get: |c| format_bool(c.send_memory).to_string(),
        apply: |c, v| {
            c.send_memory =
                parse_bool(v).ok_or_else(|| SettingError::InvalidBoolean(v.to_string()))?;
            Ok(())
        },
    }
}

/// Create a handler for the `history-message-count` setting.
pub fn history_message_count_handler() -> ModelFieldHandler {
    ModelFieldHandler {
        key: "history-message-count",
        hint: "To set how many past messages are sent, specify a number:",
        example: "chatmask set history-message-count 8",
        get: |c| c.history_message_count.to_string(),
        apply: |c, v| {
            c.history_message_count =
                parse_number("history-message-count", "a non-negative integer", v)?;
            Ok(())
        },
    }
}

/// Create a handler for the `template` setting.
pub fn template_handler() -> ModelFieldHandler {
    ModelFieldHandler {
        key: "template",
        hint: "To set the input template, specify text containing {{input}}:",
        example: "chatmask set template 'Answer briefly: {{input}}'",
        get: |c| c.template.clone(),
        apply: |c, v| {
            c.template = v.to_string();
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rejecting_handler() -> ModelFieldHandler {
        ModelFieldHandler {
            key: "model",
            hint: "",
            example: "",
            get: |c| c.model.clone(),
            apply: |_, v| {
                Err(SettingError::InvalidValue {
                    key: "model",
                    input: v.to_string(),
                    expected: "anything else",
                })
            },
        }
    }

    #[test]
    fn unset_reports_apply_failures_without_writing() {
        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        let config = AppConfig::default();
        let ctx = SetContext {
            config_path: &config_path,
            config: &config,
        };

        let err = rejecting_handler()
            .unset(&ctx)
            .expect_err("failing apply should surface");
        assert!(matches!(err, SettingError::InvalidValue { key: "model", .. }));
        assert!(!config_path.exists());
    }

    #[test]
    fn every_model_field_unsets_to_its_default() {
        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        let config = AppConfig::default();
        let ctx = SetContext {
            config_path: &config_path,
            config: &config,
        };

        let handlers = [
            model_handler(),
            provider_handler(),
            temperature_handler(),
            top_p_handler(),
            max_tokens_handler(),
            send_memory_handler(),
            history_message_count_handler(),
            template_handler(),
        ];
        for handler in &handlers {
            handler
                .unset(&ctx)
                .unwrap_or_else(|err| panic!("{} should unset: {err}", handler.key));
        }

        let saved = AppConfig::load_from_path(&config_path).expect("load");
        assert_eq!(
            saved.model_config,
            ModelConfig::default().with_model_threshold()
        );
    }
}
