// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the reasoning-model integrations
//! (Anthropic, OpenAI, Gemini, xAI).

use async_trait::async_trait;

use crate::error::KibitzError;
use crate::translate::ProgressStream;
use crate::types::{Capabilities, ProviderFamily, ProviderRequest};

/// Adapter for one provider family.
///
/// An adapter opens one exchange per call and returns its canonical
/// progress. Streaming and non-streaming delivery share the same output
/// shape; `request.stream` only selects how the provider is asked.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Human-readable adapter name.
    fn name(&self) -> &str;

    /// The provider family this adapter serves.
    fn family(&self) -> ProviderFamily;

    /// Advertised capabilities.
    fn capabilities(&self) -> Capabilities;

    /// Opens an exchange.
    ///
    /// Credential and request-building faults are returned here, before any
    /// network traffic. Faults after the connection is established arrive
    /// as an error item on the returned stream.
    async fn open(&self, request: &ProviderRequest) -> Result<ProgressStream, KibitzError>;
}
