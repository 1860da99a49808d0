// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kibitz.toml` > `~/.config/kibitz/kibitz.toml` > `/etc/kibitz/kibitz.toml`
//! with environment variable overrides via `KIBITZ_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KibitzConfig;

pub(crate) const LOCAL_CONFIG: &str = "kibitz.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/kibitz/kibitz.toml";

/// Top-level sections reachable from `KIBITZ_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["server", "engine", "anthropic", "openai", "gemini", "xai"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kibitz").join(LOCAL_CONFIG))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kibitz/kibitz.toml` (system-wide)
/// 3. `~/.config/kibitz/kibitz.toml` (user XDG config)
/// 4. `./kibitz.toml` (local directory)
/// 5. `KIBITZ_*` environment variables
pub fn load_config() -> Result<KibitzConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only, with no files or env vars.
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<KibitzConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KibitzConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KibitzConfig, figment::Error> {
    tracing::debug!(path = %path.display(), "loading config file");
    Figment::new()
        .merge(Serialized::defaults(KibitzConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KibitzConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit section mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `KIBITZ_ANTHROPIC_API_KEY` maps to `anthropic.api_key` and
/// `KIBITZ_ENGINE_DEADLINE_SECS` to `engine.deadline_secs`.
fn env_provider() -> Env {
    Env::prefixed("KIBITZ_").map(|key| map_env_key(key.as_str()).into())
}

/// Figment passes the variable name with its original case, so the key is
/// lowercased before matching.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key
}
