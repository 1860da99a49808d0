// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty endpoints, token budget ordering, and unique model ids.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::KibitzConfig;

/// Smallest extended-thinking budget the Anthropic API accepts.
const MIN_THINKING_BUDGET: u32 = 1024;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &KibitzConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(invalid("server.bind_address must not be empty"));
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(invalid(format!(
                "server.bind_address `{addr}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.port == 0 {
        errors.push(invalid("server.port must not be 0"));
    }

    for (i, origin) in config.server.allowed_origins.iter().enumerate() {
        if origin.trim().is_empty() {
            errors.push(invalid(format!("server.allowed_origins[{i}] must not be empty")));
        }
    }

    if config.engine.deadline_secs == 0 {
        errors.push(invalid("engine.deadline_secs must be greater than 0"));
    }

    for (section, url) in [
        ("anthropic", &config.anthropic.base_url),
        ("openai", &config.openai.base_url),
        ("gemini", &config.gemini.base_url),
        ("xai", &config.xai.base_url),
    ] {
        if url.trim().is_empty() {
            errors.push(invalid(format!("{section}.base_url must not be empty")));
        }
    }

    if config.anthropic.thinking_budget < MIN_THINKING_BUDGET {
        errors.push(invalid(format!(
            "anthropic.thinking_budget must be at least {MIN_THINKING_BUDGET}, got {}",
            config.anthropic.thinking_budget
        )));
    }

    if config.anthropic.max_tokens <= config.anthropic.thinking_budget {
        errors.push(invalid(format!(
            "anthropic.max_tokens ({}) must be greater than anthropic.thinking_budget ({})",
            config.anthropic.max_tokens, config.anthropic.thinking_budget
        )));
    }

    let temperature = config.xai.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        errors.push(invalid(format!(
            "xai.temperature must be between 0 and 2, got {temperature}"
        )));
    }

    let mut seen = HashSet::new();
    for (i, model) in config.models.iter().enumerate() {
        if model.id.trim().is_empty() {
            errors.push(invalid(format!("models[{i}].id must not be empty")));
        } else if !seen.insert(model.id.as_str()) {
            errors.push(invalid(format!(
                "duplicate model id `{}` in [[models]] array",
                model.id
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
