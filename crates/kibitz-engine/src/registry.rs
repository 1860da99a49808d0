// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry: model id to provider family, family to adapter.
//!
//! The family for a model is looked up once per request; every call site
//! after that goes through the adapter trait.

use std::collections::HashMap;
use std::sync::Arc;

use kibitz_anthropic::AnthropicProvider;
use kibitz_config::KibitzConfig;
use kibitz_core::{KibitzError, ProviderAdapter, ProviderFamily};
use kibitz_gemini::GeminiProvider;
use kibitz_openai::OpenAiProvider;
use kibitz_xai::XaiProvider;
use tracing::info;

/// Registry of model ids and provider adapters.
#[derive(Default)]
pub struct ProviderRegistry {
    models: HashMap<String, ProviderFamily>,
    adapters: HashMap<ProviderFamily, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configuration, with one adapter per family.
    ///
    /// Credentials are not checked here; each exchange resolves its own.
    pub fn from_config(config: &KibitzConfig) -> Result<Self, KibitzError> {
        let mut registry = Self::new();
        registry.register_adapter(Arc::new(AnthropicProvider::new(&config.anthropic)?));
        registry.register_adapter(Arc::new(OpenAiProvider::new(&config.openai)?));
        registry.register_adapter(Arc::new(GeminiProvider::new(&config.gemini)?));
        registry.register_adapter(Arc::new(XaiProvider::new(&config.xai)?));

        for entry in &config.models {
            registry.register_model(&entry.id, entry.provider);
        }
        info!(models = registry.models.len(), "provider registry built");
        Ok(registry)
    }

    /// Register (or replace) the adapter serving its family.
    pub fn register_adapter(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.family(), adapter);
    }

    /// Allow `model` and route it to `family`.
    pub fn register_model(&mut self, model: &str, family: ProviderFamily) {
        self.models.insert(model.to_string(), family);
    }

    /// The family serving `model`.
    pub fn family_for(&self, model: &str) -> Result<ProviderFamily, KibitzError> {
        self.models
            .get(model)
            .copied()
            .ok_or_else(|| KibitzError::UnknownModel(model.to_string()))
    }

    /// The adapter registered for `family`.
    pub fn adapter(&self, family: ProviderFamily) -> Result<Arc<dyn ProviderAdapter>, KibitzError> {
        self.adapters
            .get(&family)
            .cloned()
            .ok_or_else(|| KibitzError::Internal(format!("no adapter registered for {family}")))
    }

    /// Allowed model ids, sorted.
    pub fn models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = self.models.keys().map(String::as_str).collect();
        models.sort_unstable();
        models
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<String> = self.adapters.keys().map(|f| f.to_string()).collect();
        families.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("models", &self.models())
            .field("adapters", &families)
            .finish()
    }
}
