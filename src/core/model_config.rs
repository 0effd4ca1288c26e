//! Model configuration shared by the global settings and every mask.
//!
//! A [`ModelConfig`] bundles the model identity, sampling parameters, memory
//! policy, prompt template and image-generation options that a chat request
//! is built from. [`ModelConfig::default`] is the process-wide default that
//! fresh masks copy from.

use crate::core::mask::Mask;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_INPUT_TEMPLATE: &str = "{{input}}";

/// Threshold used for models the lookup table does not know about.
pub const DEFAULT_COMPRESS_THRESHOLD: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServiceProvider {
    #[default]
    OpenAI,
    Azure,
    Google,
    Anthropic,
    Baidu,
    ByteDance,
    Alibaba,
    Tencent,
    Moonshot,
    Iflytek,
    XAI,
    ChatGLM,
    DeepSeek,
    SiliconFlow,
}

impl ServiceProvider {
    pub fn display_name(self) -> &'static str {
        match self {
            ServiceProvider::OpenAI => "OpenAI",
            ServiceProvider::Azure => "Azure",
            ServiceProvider::Google => "Google",
            ServiceProvider::Anthropic => "Anthropic",
            ServiceProvider::Baidu => "Baidu",
            ServiceProvider::ByteDance => "ByteDance",
            ServiceProvider::Alibaba => "Alibaba",
            ServiceProvider::Tencent => "Tencent",
            ServiceProvider::Moonshot => "Moonshot",
            ServiceProvider::Iflytek => "Iflytek",
            ServiceProvider::XAI => "XAI",
            ServiceProvider::ChatGLM => "ChatGLM",
            ServiceProvider::DeepSeek => "DeepSeek",
            ServiceProvider::SiliconFlow => "SiliconFlow",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_PROVIDERS
            .into_iter()
            .find(|provider| provider.display_name().eq_ignore_ascii_case(name.trim()))
    }
}

pub const ALL_PROVIDERS: [ServiceProvider; 14] = [
    ServiceProvider::OpenAI,
    ServiceProvider::Azure,
    ServiceProvider::Google,
    ServiceProvider::Anthropic,
    ServiceProvider::Baidu,
    ServiceProvider::ByteDance,
    ServiceProvider::Alibaba,
    ServiceProvider::Tencent,
    ServiceProvider::Moonshot,
    ServiceProvider::Iflytek,
    ServiceProvider::XAI,
    ServiceProvider::ChatGLM,
    ServiceProvider::DeepSeek,
    ServiceProvider::SiliconFlow,
];

impl fmt::Display for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelSize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1792x1024")]
    Landscape,
    #[serde(rename = "1024x1792")]
    Portrait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DalleQuality {
    #[default]
    Standard,
    Hd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DalleStyle {
    #[default]
    Vivid,
    Natural,
}

/// How much reasoning a model may spend before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThinkingBudget(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkingMode {
    /// The model decides how long to think.
    Adaptive,
    Disabled,
    /// Hard cap in tokens.
    Limited(u32),
}

impl ThinkingBudget {
    pub const ADAPTIVE: ThinkingBudget = ThinkingBudget(-1);
    pub const DISABLED: ThinkingBudget = ThinkingBudget(0);

    pub fn mode(self) -> ThinkingMode {
        match self.0 {
            n if n < 0 => ThinkingMode::Adaptive,
            0 => ThinkingMode::Disabled,
            n => ThinkingMode::Limited(n.unsigned_abs()),
        }
    }
}

impl Default for ThinkingBudget {
    fn default() -> Self {
        ThinkingBudget::ADAPTIVE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    pub model: String,
    pub provider_name: ServiceProvider,
    pub temperature: f64,
    #[serde(rename = "top_p")]
    pub top_p: f64,
    #[serde(rename = "max_tokens")]
    pub max_tokens: u32,
    #[serde(rename = "presence_penalty")]
    pub presence_penalty: f64,
    #[serde(rename = "frequency_penalty")]
    pub frequency_penalty: f64,
    pub send_memory: bool,
    pub history_message_count: u32,
    pub compress_message_length_threshold: u32,
    /// Model used to summarize history; empty means "same as `model`".
    pub compress_model: String,
    pub compress_provider_name: String,
    pub enable_inject_system_prompts: bool,
    pub template: String,
    pub size: ModelSize,
    pub quality: DalleQuality,
    pub style: DalleStyle,
    pub thinking_budget: ThinkingBudget,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider_name: ServiceProvider::OpenAI,
            temperature: 0.5,
            top_p: 1.0,
            max_tokens: 4000,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            send_memory: true,
            history_message_count: 4,
            compress_message_length_threshold: DEFAULT_COMPRESS_THRESHOLD,
            compress_model: String::new(),
            compress_provider_name: String::new(),
            enable_inject_system_prompts: true,
            template: DEFAULT_INPUT_TEMPLATE.to_string(),
            size: ModelSize::default(),
            quality: DalleQuality::default(),
            style: DalleStyle::default(),
            thinking_budget: ThinkingBudget::default(),
        }
    }
}

impl ModelConfig {
    /// Copy of this config with the compression threshold derived from `model`.
    pub fn with_model_threshold(&self) -> ModelConfig {
        ModelConfig {
            compress_message_length_threshold: model_compress_threshold(&self.model),
            ..self.clone()
        }
    }
}

// Ordered so that longer, more specific prefixes win over shorter ones.
const COMPRESS_THRESHOLDS: &[(&str, u32)] = &[
    ("gpt-4o-mini", 128_000),
    ("gpt-4o", 128_000),
    ("gpt-4.1", 1_000_000),
    ("gpt-4-turbo", 128_000),
    ("gpt-4", 8_192),
    ("gpt-3.5-turbo", 16_385),
    ("o1", 200_000),
    ("o3", 200_000),
    ("o4-mini", 200_000),
    ("claude-", 200_000),
    ("gemini-1.5-pro", 2_000_000),
    ("gemini-1.5-flash", 1_000_000),
    ("gemini-2", 1_000_000),
    ("grok-3", 128_000),
    ("grok-4", 256_000),
    ("deepseek-", 64_000),
    ("moonshot-v1-128k", 128_000),
    ("moonshot-v1-32k", 32_000),
    ("moonshot-v1-8k", 8_000),
    ("qwen-long", 1_000_000),
    ("qwen-", 32_000),
    ("glm-4", 128_000),
];

/// Token count at which chat history for `model` gets compressed.
///
/// Exact names are tried first, then the longest matching prefix; anything
/// else falls back to [`DEFAULT_COMPRESS_THRESHOLD`].
pub fn model_compress_threshold(model: &str) -> u32 {
    let model = model.trim().to_lowercase();
    if let Some((_, threshold)) = COMPRESS_THRESHOLDS.iter().find(|(name, _)| *name == model) {
        return *threshold;
    }
    COMPRESS_THRESHOLDS
        .iter()
        .filter(|(prefix, _)| model.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, threshold)| *threshold)
        .unwrap_or(DEFAULT_COMPRESS_THRESHOLD)
}

/// The config a session started from `mask` actually runs with.
pub fn effective_model_config(mask: &Mask, global: &ModelConfig) -> ModelConfig {
    if mask.sync_global_config.unwrap_or(false) {
        global.clone()
    } else {
        mask.model_config.clone()
    }
}

/// Model name to display and send for `mask`, honoring its `default_model` override.
pub fn resolve_model(mask: &Mask, global: &ModelConfig) -> String {
    match mask.default_model.as_deref().map(str::trim) {
        Some(model) if !model.is_empty() => model.to_string(),
        _ => effective_model_config(mask, global).model,
    }
}
