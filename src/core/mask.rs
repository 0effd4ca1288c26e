//! Mask (assistant profile) entity and the factories that build well-formed instances.
//!
//! Built-in masks are never trusted from disk: the store rebuilds them from
//! the factories below on every read, so the factories must stay
//! deterministic for a given input.

use crate::core::lang::Lang;
use crate::core::model_config::{
    DalleQuality, DalleStyle, ModelConfig, ModelSize, ServiceProvider, ThinkingBudget,
    DEFAULT_INPUT_TEMPLATE,
};
use crate::utils::id::new_id;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_MASK_ID: &str = "default-mask";
pub const TRANSLATE_MASK_ID: &str = "translate-mask";
pub const ARGUE_MASK_ID: &str = "argue-mask";
pub const BUILTIN_MASK_IDS: [&str; 3] = [DEFAULT_MASK_ID, TRANSLATE_MASK_ID, ARGUE_MASK_ID];

pub const DEFAULT_MASK_AVATAR: &str = "gpt-bot";
pub const DEFAULT_TOPIC: &str = "New Conversation";

/// 2025-09-01T00:00:00+08:00, shared by every built-in mask.
pub const BUILTIN_CREATED_AT: i64 = 1_756_656_000_000;

const BUILTIN_AVATAR: &str = "1f40b";
const PRESET_MODEL: &str = "grok-3-fast";
const TRANSLATE_BEND_URL: &str = "http://localhost:8088/api/v/translate";
const ARGUE_BEND_URL: &str = "http://localhost:8088/api/v/argue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    #[default]
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// A seed message injected at the start of every session using the mask.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub date: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            date: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mask {
    pub id: String,
    pub created_at: i64,
    pub avatar: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_context: Option<bool>,
    /// When true, sessions use the global model config instead of `model_config`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_global_config: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    pub lang: Lang,
    pub builtin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_artifacts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_code_fold: Option<bool>,
    /// Assistant-specific backend; requests go here instead of the provider path when non-empty.
    pub bend_url: String,
    pub bot_avatar: String,
    pub bot_name: String,
    pub my_avatar: String,
    pub model_config: ModelConfig,
    pub context: Vec<ChatMessage>,
}

/// Partial override applied on top of a fresh mask by `MaskStore::create`.
#[derive(Debug, Clone, Default)]
pub struct MaskPatch {
    pub id: Option<String>,
    pub created_at: Option<i64>,
    pub avatar: Option<String>,
    pub name: Option<String>,
    pub hide_context: Option<bool>,
    pub context: Option<Vec<ChatMessage>>,
    pub sync_global_config: Option<bool>,
    pub model_config: Option<ModelConfig>,
    pub default_model: Option<String>,
    pub lang: Option<Lang>,
    pub builtin: Option<bool>,
    pub enable_artifacts: Option<bool>,
    pub enable_code_fold: Option<bool>,
    pub bend_url: Option<String>,
    pub bot_avatar: Option<String>,
    pub bot_name: Option<String>,
    pub my_avatar: Option<String>,
}

impl MaskPatch {
    /// Overwrite every field of `mask` that this patch sets.
    pub fn apply(self, mask: &mut Mask) {
        if let Some(id) = self.id {
            mask.id = id;
        }
        if let Some(created_at) = self.created_at {
            mask.created_at = created_at;
        }
        if let Some(avatar) = self.avatar {
            mask.avatar = avatar;
        }
        if let Some(name) = self.name {
            mask.name = name;
        }
        if let Some(hide_context) = self.hide_context {
            mask.hide_context = Some(hide_context);
        }
        if let Some(context) = self.context {
            mask.context = context;
        }
        if let Some(sync) = self.sync_global_config {
            mask.sync_global_config = Some(sync);
        }
        if let Some(model_config) = self.model_config {
            mask.model_config = model_config;
        }
        if let Some(default_model) = self.default_model {
            mask.default_model = Some(default_model);
        }
        if let Some(lang) = self.lang {
            mask.lang = lang;
        }
        if let Some(builtin) = self.builtin {
            mask.builtin = builtin;
        }
        if let Some(enable_artifacts) = self.enable_artifacts {
            mask.enable_artifacts = Some(enable_artifacts);
        }
        if let Some(enable_code_fold) = self.enable_code_fold {
            mask.enable_code_fold = Some(enable_code_fold);
        }
        if let Some(bend_url) = self.bend_url {
            mask.bend_url = bend_url;
        }
        if let Some(bot_avatar) = self.bot_avatar {
            mask.bot_avatar = bot_avatar;
        }
        if let Some(bot_name) = self.bot_name {
            mask.bot_name = bot_name;
        }
        if let Some(my_avatar) = self.my_avatar {
            mask.my_avatar = my_avatar;
        }
    }
}

pub fn is_builtin_id(id: &str) -> bool {
    BUILTIN_MASK_IDS.contains(&id)
}

fn default_mask_name(lang: Lang) -> &'static str {
    match lang {
        Lang::Cn => "默认助手",
        Lang::Tw => "預設助手",
        _ => "Default Assistant",
    }
}

/// The protected default assistant.
///
/// Its model config is a copy of `global` with the compression threshold
/// derived from the global model. It does not track later global edits.
pub fn create_default_mask(global: &ModelConfig, lang: Lang) -> Mask {
    Mask {
        id: DEFAULT_MASK_ID.to_string(),
        created_at: BUILTIN_CREATED_AT,
        avatar: BUILTIN_AVATAR.to_string(),
        name: default_mask_name(lang).to_string(),
        hide_context: None,
        sync_global_config: Some(false),
        default_model: None,
        lang,
        builtin: true,
        enable_artifacts: None,
        enable_code_fold: None,
        bend_url: String::new(),
        bot_avatar: String::new(),
        bot_name: String::new(),
        my_avatar: String::new(),
        model_config: global.with_model_threshold(),
        context: Vec::new(),
    }
}

fn preset_model_config() -> ModelConfig {
    ModelConfig {
        model: PRESET_MODEL.to_string(),
        provider_name: ServiceProvider::XAI,
        temperature: 0.5,
        top_p: 1.0,
        max_tokens: 4000,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
        send_memory: true,
        history_message_count: 4,
        compress_message_length_threshold: 128_000,
        compress_model: String::new(),
        compress_provider_name: String::new(),
        enable_inject_system_prompts: true,
        template: DEFAULT_INPUT_TEMPLATE.to_string(),
        size: ModelSize::Square,
        quality: DalleQuality::Standard,
        style: DalleStyle::Vivid,
        thinking_budget: ThinkingBudget::DISABLED,
    }
}

fn preset_mask(
    id: &str,
    name: &str,
    lang: Lang,
    bend_url: &str,
    bot_avatar: &str,
    bot_name: &str,
) -> Mask {
    Mask {
        id: id.to_string(),
        created_at: BUILTIN_CREATED_AT,
        avatar: BUILTIN_AVATAR.to_string(),
        name: name.to_string(),
        hide_context: None,
        sync_global_config: Some(false),
        default_model: None,
        lang,
        builtin: true,
        enable_artifacts: None,
        enable_code_fold: None,
        bend_url: bend_url.to_string(),
        bot_avatar: bot_avatar.to_string(),
        bot_name: bot_name.to_string(),
        my_avatar: "my.jpg".to_string(),
        model_config: preset_model_config(),
        context: Vec::new(),
    }
}

pub fn create_translate_mask(lang: Lang) -> Mask {
    preset_mask(
        TRANSLATE_MASK_ID,
        "translate",
        lang,
        TRANSLATE_BEND_URL,
        "frieren.png",
        "translator",
    )
}

pub fn create_argue_mask(lang: Lang) -> Mask {
    preset_mask(
        ARGUE_MASK_ID,
        "Charlie",
        lang,
        ARGUE_BEND_URL,
        "Charlie.jpg",
        "Charlie",
    )
}

/// A fresh user mask that follows the global config until edited.
pub fn create_empty_mask(global: &ModelConfig, lang: Lang) -> Mask {
    Mask {
        id: new_id(),
        created_at: Utc::now().timestamp_millis(),
        avatar: DEFAULT_MASK_AVATAR.to_string(),
        name: DEFAULT_TOPIC.to_string(),
        hide_context: None,
        sync_global_config: Some(true),
        default_model: None,
        lang,
        builtin: false,
        enable_artifacts: None,
        enable_code_fold: None,
        bend_url: String::new(),
        bot_avatar: String::new(),
        bot_name: String::new(),
        my_avatar: String::new(),
        model_config: global.with_model_threshold(),
        context: Vec::new(),
    }
}

/// Every built-in mask, freshly built.
pub fn builtin_masks(global: &ModelConfig, lang: Lang) -> Vec<Mask> {
    vec![
        create_default_mask(global, lang),
        create_translate_mask(lang),
        create_argue_mask(lang),
    ]
}

/// Structural comparison between `candidate` and the mask stored under `id`.
pub fn is_same_mask(masks: &BTreeMap<String, Mask>, id: &str, candidate: &Mask) -> bool {
    match masks.get(id) {
        Some(current) if current == candidate => true,
        Some(current) => {
            debug!(id, current = ?current, candidate = ?candidate, "Mask differs from candidate");
            false
        }
        None => {
            debug!(id, "No stored mask to compare against");
            false
        }
    }
}
