//! Registry of setting handlers.

use std::collections::HashMap;

use super::handlers::{
    history_message_count_handler, max_tokens_handler, model_handler, provider_handler,
    send_memory_handler, temperature_handler, template_handler, top_p_handler, LangHandler,
    StorePathHandler,
};
use super::SettingHandler;
use crate::core::config::AppConfig;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `chatmask set` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        // Register handlers in display order
        registry.register(Box::new(LangHandler));
        registry.register(Box::new(StorePathHandler));
        registry.register(Box::new(model_handler()));
        registry.register(Box::new(provider_handler()));
        registry.register(Box::new(temperature_handler()));
        registry.register(Box::new(top_p_handler()));
        registry.register(Box::new(max_tokens_handler()));
        registry.register(Box::new(send_memory_handler()));
        registry.register(Box::new(history_message_count_handler()));
        registry.register(Box::new(template_handler()));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }

    /// Print every setting with its current value.
    pub fn print_all(&self, config: &AppConfig) {
        println!("Current configuration:");
        for key in &self.display_order {
            if let Some(handler) = self.get(key) {
                println!("{}", handler.format(config));
            }
        }
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
