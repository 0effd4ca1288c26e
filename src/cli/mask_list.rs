use crate::core::mask::Mask;
use crate::core::model_config::{effective_model_config, ModelConfig};
use chrono::{DateTime, Utc};

fn format_created(created_at: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(created_at)
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| created_at.to_string())
}

/// One line per mask: `• name [id] model, created`.
pub fn mask_line(mask: &Mask, global: &ModelConfig) -> String {
    let config = effective_model_config(mask, global);
    let marker = if mask.builtin { " (built-in)" } else { "" };
    format!(
        "  • {}{} [{}] {}, created {}",
        mask.name,
        marker,
        mask.id,
        config.model,
        format_created(mask.created_at)
    )
}

pub fn list_masks(builtins: &[Mask], user_masks: &[Mask], global: &ModelConfig) {
    println!("Built-in masks:\n");
    for mask in builtins {
        println!("{}", mask_line(mask, global));
    }

    println!("\nYour masks:\n");
    if user_masks.is_empty() {
        println!("  No masks yet.");
        println!("\n💡 Create one with:");
        println!("   chatmask create --name <name>");
    } else {
        for mask in user_masks {
            println!("{}", mask_line(mask, global));
        }
    }
}

pub fn show_mask(mask: &Mask, global: &ModelConfig) {
    let config = effective_model_config(mask, global);
    let follows_global = mask.sync_global_config.unwrap_or(false);

    println!("{} [{}]", mask.name, mask.id);
    println!("  created: {}", format_created(mask.created_at));
    println!("  lang: {}", mask.lang);
    println!("  built-in: {}", if mask.builtin { "yes" } else { "no" });
    println!(
        "  model: {} ({}){}",
        config.model,
        config.provider_name,
        if follows_global { ", follows global config" } else { "" }
    );
    println!("  temperature: {}", config.temperature);
    println!(
        "  memory: {} (last {} messages)",
        if config.send_memory { "on" } else { "off" },
        config.history_message_count
    );
    if !mask.bend_url.is_empty() {
        println!("  backend: {}", mask.bend_url);
    }
    if !mask.bot_name.is_empty() {
        println!("  bot: {}", mask.bot_name);
    }
    if mask.context.is_empty() {
        println!("  context: (empty)");
    } else {
        println!("  context:");
        for message in &mask.context {
            println!("    {}: {}", message.role.as_str(), message.content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lang::Lang;
    use crate::core::mask::{create_default_mask, create_empty_mask};

    #[test]
    fn builtin_lines_are_marked() {
        let global = ModelConfig::default();
        let line = mask_line(&create_default_mask(&global, Lang::En), &global);
        assert!(line.contains("(built-in)"));
        assert!(line.contains("[default-mask]"));
        assert!(line.contains("2025-08-31"));
    }

    #[test]
    fn user_lines_show_effective_model() {
        let global = ModelConfig {
            model: "deepseek-chat".to_string(),
            ..ModelConfig::default()
        };
        let mask = create_empty_mask(&ModelConfig::default(), Lang::En);
        let line = mask_line(&mask, &global);
        assert!(!line.contains("(built-in)"));
        assert!(line.contains("deepseek-chat"));
    }
}
