// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Kibitz crate.

use thiserror::Error;

use crate::types::ProviderFamily;

/// The primary error type used across provider adapters, translators and the orchestrator.
#[derive(Debug, Error)]
pub enum KibitzError {
    /// Server-side configuration fault (missing credential, unusable header value).
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider network/API failure, malformed payload, or missing content in a terminal response.
    #[error("error calling {} API: {message}", .family.api_name())]
    Upstream {
        family: ProviderFamily,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No provider family is registered for the requested model.
    #[error("unknown model `{0}`")]
    UnknownModel(String),

    /// The caller-supplied deadline expired before the exchange finished.
    #[error("error calling {} API: timed out after {duration:?}", .family.api_name())]
    Timeout {
        family: ProviderFamily,
        duration: std::time::Duration,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KibitzError {
    /// Builds an [`KibitzError::Upstream`] without an underlying source.
    pub fn upstream(family: ProviderFamily, message: impl Into<String>) -> Self {
        Self::Upstream {
            family,
            message: message.into(),
            source: None,
        }
    }

    /// Builds an [`KibitzError::Upstream`] wrapping an underlying error.
    pub fn upstream_with<E>(family: ProviderFamily, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Upstream {
            family,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True when the fault lies with the caller's input rather than the server.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::UnknownModel(_))
    }

    /// True for faults in the server's own configuration.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
