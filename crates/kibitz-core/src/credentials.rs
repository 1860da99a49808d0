// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-exchange credential lookup.

use crate::error::KibitzError;
use crate::types::ProviderFamily;

/// Resolves a provider credential.
///
/// Priority: configured key, then the family's environment variable.
/// Blank values count as missing.
pub fn resolve_api_key(
    family: ProviderFamily,
    configured: Option<&str>,
) -> Result<String, KibitzError> {
    resolve_with(family, configured, |name| std::env::var(name).ok())
}

fn resolve_with(
    family: ProviderFamily,
    configured: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, KibitzError> {
    if let Some(key) = configured
        && !key.trim().is_empty()
    {
        return Ok(key.to_string());
    }

    let env_var = family.credential_env();
    match lookup(env_var) {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(KibitzError::Config(format!(
            "{} API key not configured: set {}.api_key in config or {env_var} environment variable",
            family.api_name(),
            family,
        ))),
    }
}
