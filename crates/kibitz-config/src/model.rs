// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Kibitz.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use kibitz_core::ProviderFamily;
use serde::{Deserialize, Serialize};

/// Top-level Kibitz configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KibitzConfig {
    /// HTTP gateway settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Exchange orchestration settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Anthropic Messages API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// OpenAI Responses API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Google Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// xAI chat completions settings.
    #[serde(default)]
    pub xai: XaiConfig,

    /// Model allow-list and model-to-provider lookup.
    #[serde(default = "default_models")]
    pub models: Vec<ModelEntry>,
}

impl Default for KibitzConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            engine: EngineConfig::default(),
            anthropic: AnthropicConfig::default(),
            openai: OpenAiConfig::default(),
            gemini: GeminiConfig::default(),
            xai: XaiConfig::default(),
            models: default_models(),
        }
    }
}

impl KibitzConfig {
    /// Looks up the provider family serving `model`.
    pub fn provider_for(&self, model: &str) -> Option<ProviderFamily> {
        self.models.iter().find(|m| m.id == model).map(|m| m.provider)
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the CORS layer.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            log_level: default_log_level(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Exchange orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Deadline for one whole exchange, in seconds.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
        }
    }
}

fn default_deadline_secs() -> u64 {
    120
}

/// Anthropic Messages API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires the `ANTHROPIC_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    /// Value of the `anthropic-version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Output token ceiling. Must exceed `thinking_budget`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Extended thinking budget in tokens.
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,

    /// System prompt sent with streaming exchanges.
    #[serde(default = "default_anthropic_system_prompt")]
    pub system_prompt: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_anthropic_base_url(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            thinking_budget: default_thinking_budget(),
            system_prompt: default_anthropic_system_prompt(),
        }
    }
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_max_tokens() -> u32 {
    1100
}

fn default_thinking_budget() -> u32 {
    1024
}

fn default_anthropic_system_prompt() -> String {
    "You are a chess AI. When thinking is enabled, use your thinking to analyze the position \
     thoroughly, then provide only the chess move (or RESIGN/DRAW_OFFER) in your response \
     without any explanation."
        .to_string()
}

/// OpenAI Responses API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. `None` requires the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: String,

    /// Reasoning summary verbosity (`auto`, `concise`, `detailed`).
    #[serde(default = "default_reasoning_summary")]
    pub reasoning_summary: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            reasoning_effort: default_reasoning_effort(),
            reasoning_summary: default_reasoning_summary(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_reasoning_effort() -> String {
    "low".to_string()
}

fn default_reasoning_summary() -> String {
    "detailed".to_string()
}

/// Google Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Ask the model to return its thought summaries.
    #[serde(default = "default_true")]
    pub include_thoughts: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            include_thoughts: true,
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_true() -> bool {
    true
}

/// xAI chat completions configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct XaiConfig {
    /// xAI API key. `None` requires the `XAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_xai_base_url")]
    pub base_url: String,

    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_xai_system_prompt")]
    pub system_prompt: String,
}

impl Default for XaiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_xai_base_url(),
            reasoning_effort: default_reasoning_effort(),
            temperature: default_temperature(),
            system_prompt: default_xai_system_prompt(),
        }
    }
}

fn default_xai_base_url() -> String {
    "https://api.x.ai".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_xai_system_prompt() -> String {
    "You are a chess AI. Provide only the move in standard algebraic notation.".to_string()
}

/// One allowed model and the provider family that serves it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntry {
    pub id: String,
    pub provider: ProviderFamily,
}

impl ModelEntry {
    pub fn new(id: impl Into<String>, provider: ProviderFamily) -> Self {
        Self {
            id: id.into(),
            provider,
        }
    }
}

/// The stock allow-list.
pub fn default_models() -> Vec<ModelEntry> {
    vec![
        ModelEntry::new("claude-opus-4-20250514", ProviderFamily::Anthropic),
        ModelEntry::new("claude-sonnet-4-20250514", ProviderFamily::Anthropic),
        ModelEntry::new("o4-mini", ProviderFamily::OpenAi),
        ModelEntry::new("gemini-2.5-pro-preview-05-06", ProviderFamily::Gemini),
        ModelEntry::new("gemini-2.5-flash-preview-05-20", ProviderFamily::Gemini),
        ModelEntry::new("grok-3-mini", ProviderFamily::Xai),
    ]
}
