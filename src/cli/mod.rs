//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod mask_list;
pub mod settings;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::api::{resolve_endpoint, ChatRequest};
use crate::cli::mask_list::{list_masks, show_mask};
use crate::cli::settings::{SetContext, SettingError, SettingRegistry};
use crate::core::config::{path_display, AppConfig};
use crate::core::lang::Lang;
use crate::core::mask::{is_builtin_id, ChatMessage, Mask, MaskPatch, Role, DEFAULT_MASK_ID};
use crate::core::mask_store::{sort_newest_first, MaskStore};
use crate::core::model_config::ModelConfig;
use crate::core::session::find_mask;
use crate::utils::logging;

#[derive(Parser)]
#[command(name = "chatmask")]
#[command(about = "Manage the masks (assistant presets) of an LLM chat client")]
#[command(
    long_about = "Chatmask keeps a versioned store of masks: named assistant presets that bundle \
a model configuration, seed context messages, and display metadata. Built-in masks are always \
available; your own masks are saved to the mask store file.\n\n\
Environment Variables:\n\
  CHATMASK_LOG      Log filter directives (e.g. debug, chatmask=trace)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Mask store file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List built-in and saved masks (default)
    List,
    /// Search saved masks
    Search {
        /// Text to search for
        text: Option<String>,
    },
    /// Show one mask in detail
    Show {
        /// Mask id
        id: String,
    },
    /// Create a new mask
    Create {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Avatar identifier
        #[arg(long)]
        avatar: Option<String>,
        /// Name shown for the assistant
        #[arg(long)]
        bot_name: Option<String>,
        /// Assistant-specific backend URL
        #[arg(long)]
        bend_url: Option<String>,
        /// Pin a model instead of following the global config
        #[arg(long)]
        model: Option<String>,
        /// Seed message as ROLE:TEXT (repeatable)
        #[arg(long = "context", value_name = "ROLE:TEXT")]
        context: Vec<String>,
    },
    /// Rename a saved mask
    Rename {
        /// Mask id
        id: String,
        /// New name (can be multiple words)
        #[arg(trailing_var_arg = true, required = true)]
        name: Vec<String>,
    },
    /// Delete a saved mask
    Delete {
        /// Mask id
        id: String,
    },
    /// Show or change the language recorded in the mask store
    Lang {
        /// Language code (cn, en, tw, jp, ko, fr, de, es, it, ru)
        lang: Option<Lang>,
        /// Clear the stored language
        #[arg(long, conflicts_with = "lang")]
        clear: bool,
    },
    /// Print the chat request a mask would send for some input
    Request {
        /// Mask id
        id: String,
        /// User input (can be multiple words)
        #[arg(trailing_var_arg = true, required = true)]
        input: Vec<String>,
        /// Session id sent to assistant-specific backends
        #[arg(long, default_value = "preview")]
        session: String,
        /// Provider base URL
        #[arg(long, default_value = "")]
        base_url: String,
        /// Request a streamed response
        #[arg(long)]
        stream: bool,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

impl Commands {
    /// Whether running the command can change the mask store.
    fn mutates_store(&self) -> bool {
        match self {
            Commands::Create { .. } | Commands::Rename { .. } | Commands::Delete { .. } => true,
            Commands::Lang { lang, clear } => *clear || lang.is_some(),
            _ => false,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);
    run(args)
}

fn resolve_config_path(args: &Args) -> Result<PathBuf, Box<dyn Error>> {
    match &args.config {
        Some(path) => Ok(path.clone()),
        None => Ok(AppConfig::get_config_path()?),
    }
}

fn open_store(args: &Args, config: AppConfig) -> Result<MaskStore, Box<dyn Error>> {
    let path = args
        .store
        .clone()
        .or_else(|| config.resolved_store_path())
        .ok_or("Failed to determine where to keep the mask store; pass --store")?;
    debug!(path = %path_display(&path), "Opening mask store");
    Ok(MaskStore::open(path, config)?)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config_path = resolve_config_path(&args)?;
    let config = AppConfig::load_from_path(&config_path)?;

    match args.command.as_ref().unwrap_or(&Commands::List) {
        Commands::Set { key, value } => {
            run_set(&config_path, &config, key.as_deref(), value);
            Ok(())
        }
        Commands::Unset { key } => {
            run_unset(&config_path, &config, key);
            Ok(())
        }
        command => {
            let mut store = open_store(&args, config)?;
            run_store_command(&mut store, command)?;
            if command.mutates_store() && store.flush()? {
                debug!("Saved mask store");
            }
            Ok(())
        }
    }
}

fn run_store_command(store: &mut MaskStore, command: &Commands) -> Result<(), Box<dyn Error>> {
    let global = store.app_config().model_config.clone();

    match command {
        Commands::List => {
            list_masks(&store.get_all(), &user_masks(store), &global);
        }
        Commands::Search { text } => {
            let found = sort_newest_first(store.search(text.as_deref().unwrap_or("")));
            if found.is_empty() {
                println!("No saved masks.");
            }
            for mask in &found {
                println!("{}", mask_list::mask_line(mask, &global));
            }
        }
        Commands::Show { id } => {
            let mask = find_mask(store, id).ok_or_else(|| format!("Mask '{id}' not found"))?;
            show_mask(&mask, &global);
        }
        Commands::Create {
            name,
            avatar,
            bot_name,
            bend_url,
            model,
            context,
        } => {
            let patch = create_patch(
                &global,
                name.clone(),
                avatar.clone(),
                bot_name.clone(),
                bend_url.clone(),
                model.clone(),
                context,
            )?;
            let mask = store.create(Some(patch));
            println!("✅ Created mask '{}' with id: {}", mask.name, mask.id);
        }
        Commands::Rename { id, name } => {
            let name = name.join(" ");
            if store.update_mask(id, |mask| mask.name = name.clone()) {
                println!("✅ Renamed mask {id} to: {name}");
            } else {
                return Err(format!("Mask '{id}' not found").into());
            }
        }
        Commands::Delete { id } => {
            if id == DEFAULT_MASK_ID {
                eprintln!("⚠️  The default mask cannot be deleted");
            } else if store.delete(id) {
                println!("✅ Deleted mask {id}");
            } else {
                return Err(format!("Mask '{id}' not found").into());
            }
        }
        Commands::Lang { lang, clear } => {
            if *clear {
                store.set_language(None);
                println!("✅ Cleared mask store language");
            } else if let Some(lang) = lang {
                store.set_language(Some(*lang));
                println!("✅ Set mask store language to: {lang}");
            } else {
                match store.language() {
                    Some(lang) => println!("Mask store language: {lang}"),
                    None => println!(
                        "Mask store language: (unset, using {})",
                        store.app_config().lang()
                    ),
                }
            }
        }
        Commands::Request {
            id,
            input,
            session,
            base_url,
            stream,
        } => {
            let mask = find_mask(store, id).ok_or_else(|| format!("Mask '{id}' not found"))?;
            let (endpoint, body) = preview_request(
                &mask,
                &global,
                &input.join(" "),
                session,
                base_url,
                *stream,
            )?;
            println!("POST {endpoint}");
            println!("{body}");
        }
        Commands::Set { .. } | Commands::Unset { .. } => {}
    }

    Ok(())
}

/// Saved masks other than stored copies of built-ins, newest first.
fn user_masks(store: &MaskStore) -> Vec<Mask> {
    sort_newest_first(
        store
            .search("")
            .into_iter()
            .filter(|mask| !is_builtin_id(&mask.id))
            .collect(),
    )
}

fn create_patch(
    global: &ModelConfig,
    name: Option<String>,
    avatar: Option<String>,
    bot_name: Option<String>,
    bend_url: Option<String>,
    model: Option<String>,
    context: &[String],
) -> Result<MaskPatch, Box<dyn Error>> {
    let context = context
        .iter()
        .map(String::as_str)
        .map(parse_context_entry)
        .collect::<Result<Vec<_>, _>>()?;

    let mut patch = MaskPatch {
        name,
        avatar,
        bot_name,
        bend_url,
        context: (!context.is_empty()).then_some(context),
        ..Default::default()
    };

    if let Some(model) = model {
        let mut model_config = global.clone();
        model_config.model = model;
        patch.model_config = Some(model_config.with_model_threshold());
        patch.sync_global_config = Some(false);
    }

    Ok(patch)
}

/// Parse `ROLE:TEXT` into a context message.
pub fn parse_context_entry(entry: &str) -> Result<ChatMessage, String> {
    let (role, text) = entry
        .split_once(':')
        .ok_or_else(|| format!("Context entry '{entry}' must look like ROLE:TEXT"))?;
    let role = Role::from_name(role)
        .ok_or_else(|| format!("Unknown role '{role}'; use system, user or assistant"))?;
    Ok(ChatMessage::new(role, text.trim()))
}

/// Endpoint URL and JSON body of the request `mask` would send for `input`.
pub fn preview_request(
    mask: &Mask,
    global: &ModelConfig,
    input: &str,
    session_id: &str,
    base_url: &str,
    stream: bool,
) -> Result<(String, String), Box<dyn Error>> {
    let endpoint = resolve_endpoint(mask, global, base_url);
    let mut request = ChatRequest::for_mask(mask, global, &[], input, stream);
    if endpoint.is_bend() {
        request.route_to_bend(session_id, &mask.name)?;
    }
    Ok((endpoint.url().to_string(), request.to_json()?))
}

fn run_set(config_path: &Path, config: &AppConfig, key: Option<&str>, value: &[String]) {
    let registry = SettingRegistry::new();
    let Some(key) = key else {
        registry.print_all(config);
        return;
    };

    let ctx = SetContext {
        config_path,
        config,
    };
    let result = match registry.get(key) {
        Some(handler) if value.is_empty() => {
            println!("{}", handler.format(config));
            return;
        }
        Some(handler) => handler.set(value, &ctx),
        None => Err(SettingError::UnknownKey(key.to_string())),
    };
    report(result);
}

fn run_unset(config_path: &Path, config: &AppConfig, key: &str) {
    let registry = SettingRegistry::new();
    let ctx = SetContext {
        config_path,
        config,
    };
    let result = match registry.get(key) {
        Some(handler) => handler.unset(&ctx),
        None => Err(SettingError::UnknownKey(key.to_string())),
    };
    report(result);
}

fn report(result: Result<String, SettingError>) {
    match result {
        Ok(message) => println!("{message}"),
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}

#[cfg(test)]
mod tests;
