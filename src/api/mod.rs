//! Normalized chat request handed to provider adapters, and where it gets sent.

use crate::core::mask::{ChatMessage, Mask};
use crate::core::model_config::{effective_model_config, resolve_model, ModelConfig, ServiceProvider};
use crate::utils::url::{construct_api_url, ensure_scheme, normalize_base_url};
use serde::{Deserialize, Serialize};

pub const CHAT_PATH: &str = "v1/chat/completions";
const INPUT_VAR: &str = "{{input}}";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RequestMessage {
    pub role: String,
    pub content: String,
}

impl From<&ChatMessage> for RequestMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<RequestMessage>,
    pub stream: bool,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

/// Marker sent as `model` when a request goes to an assistant-specific backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BendRouteModel {
    pub sessionid: String,
    pub maskname: String,
}

impl ChatRequest {
    pub fn from_config(messages: Vec<RequestMessage>, config: &ModelConfig, stream: bool) -> Self {
        Self {
            messages,
            stream,
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }

    /// Build the request for `user_input` in a session started from `mask`.
    ///
    /// Messages are the mask's context, then as much of `history` as the
    /// memory policy allows, then the input rendered through the template.
    pub fn for_mask(
        mask: &Mask,
        global: &ModelConfig,
        history: &[ChatMessage],
        user_input: &str,
        stream: bool,
    ) -> Self {
        let config = effective_model_config(mask, global);
        let mut messages: Vec<RequestMessage> =
            mask.context.iter().map(RequestMessage::from).collect();
        messages.extend(recent_history(history, &config).iter().map(RequestMessage::from));
        messages.push(RequestMessage {
            role: "user".to_string(),
            content: fill_template(&config.template, user_input),
        });

        let mut request = Self::from_config(messages, &config, stream);
        request.model = resolve_model(mask, global);
        request
    }

    /// Replace `model` with the JSON marker bend routes identify sessions by.
    pub fn route_to_bend(&mut self, session_id: &str, mask_name: &str) -> serde_json::Result<()> {
        self.model = serde_json::to_string(&BendRouteModel {
            sessionid: session_id.to_string(),
            maskname: mask_name.to_string(),
        })?;
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn recent_history<'a>(history: &'a [ChatMessage], config: &ModelConfig) -> &'a [ChatMessage] {
    if !config.send_memory {
        return &[];
    }
    let keep = (config.history_message_count as usize).min(history.len());
    &history[history.len() - keep..]
}

/// Render `input` through a prompt template; templates without `{{input}}` get it appended.
pub fn fill_template(template: &str, input: &str) -> String {
    let template = if template.trim().is_empty() {
        INPUT_VAR.to_string()
    } else if template.contains(INPUT_VAR) {
        template.to_string()
    } else {
        format!("{template}\n{INPUT_VAR}")
    };
    template.replace(INPUT_VAR, input)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The mask's own backend.
    Bend(String),
    Provider(String),
}

impl Endpoint {
    pub fn url(&self) -> &str {
        match self {
            Endpoint::Bend(url) | Endpoint::Provider(url) => url,
        }
    }

    pub fn is_bend(&self) -> bool {
        matches!(self, Endpoint::Bend(_))
    }
}

/// Local proxy path requests for `provider` go through when no base URL is configured.
pub fn provider_api_path(provider: ServiceProvider) -> String {
    format!("/api/{}", provider.display_name().to_lowercase())
}

/// Where a chat request for `mask` goes: its bend URL when set, otherwise
/// `CHAT_PATH` under `base_url` (or the provider's proxy path when `base_url` is empty).
pub fn resolve_endpoint(mask: &Mask, global: &ModelConfig, base_url: &str) -> Endpoint {
    let bend_url = mask.bend_url.trim();
    if !bend_url.is_empty() {
        return Endpoint::Bend(bend_url.to_string());
    }

    let provider = effective_model_config(mask, global).provider_name;
    let proxy_path = provider_api_path(provider);
    let base = normalize_base_url(base_url.trim());
    let base = if base.is_empty() {
        proxy_path
    } else {
        ensure_scheme(&base, &proxy_path)
    };
    Endpoint::Provider(construct_api_url(&base, CHAT_PATH))
}
