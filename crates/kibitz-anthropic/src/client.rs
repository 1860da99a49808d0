// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication, and streaming SSE responses. Requests are never retried.

use std::time::Duration;

use kibitz_core::{KibitzError, ProviderFamily, RawStream};
use reqwest::header::HeaderValue;
use tracing::{debug, warn};

use crate::sse::{self, StreamEvent};
use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

const FAMILY: ProviderFamily = ProviderFamily::Anthropic;

/// HTTP client for Anthropic API communication.
///
/// Idle connections are not pooled, so dropping a response stream closes
/// its connection.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    messages_url: String,
    api_version: HeaderValue,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    ///
    /// # Arguments
    /// * `base_url` - API origin, e.g. `https://api.anthropic.com`
    /// * `api_version` - value of the `anthropic-version` header
    pub fn new(base_url: &str, api_version: &str) -> Result<Self, KibitzError> {
        let api_version = HeaderValue::from_str(api_version).map_err(|e| {
            KibitzError::Config(format!("invalid anthropic.api_version header value: {e}"))
        })?;

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                KibitzError::upstream_with(FAMILY, format!("failed to build HTTP client: {e}"), e)
            })?;

        Ok(Self {
            http,
            messages_url: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            api_version,
        })
    }

    async fn send(
        &self,
        api_key: &str,
        request: &MessageRequest,
    ) -> Result<reqwest::Response, KibitzError> {
        let api_key = HeaderValue::from_str(api_key)
            .map_err(|e| KibitzError::Config(format!("invalid Anthropic API key header value: {e}")))?;

        let response = self
            .http
            .post(&self.messages_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", self.api_version.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| KibitzError::upstream_with(FAMILY, format!("HTTP request failed: {e}"), e))?;

        let status = response.status();
        debug!(status = %status, stream = request.stream, "Anthropic response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!("{} (HTTP {status})", api_err.error),
            Err(_) => format!("API returned {status}: {body}"),
        };
        warn!(status = %status, "Anthropic request rejected");
        Err(KibitzError::upstream(FAMILY, message))
    }

    /// Sends a streaming request and returns a stream of SSE events.
    pub async fn stream_message(
        &self,
        api_key: &str,
        request: &MessageRequest,
    ) -> Result<RawStream<StreamEvent>, KibitzError> {
        let response = self.send(api_key, request).await?;
        Ok(sse::parse_sse_stream(response))
    }

    /// Sends a non-streaming request and returns the full response.
    pub async fn complete_message(
        &self,
        api_key: &str,
        request: &MessageRequest,
    ) -> Result<MessageResponse, KibitzError> {
        let response = self.send(api_key, request).await?;
        let body = response.text().await.map_err(|e| {
            KibitzError::upstream_with(FAMILY, format!("failed to read response body: {e}"), e)
        })?;
        serde_json::from_str(&body).map_err(|e| {
            KibitzError::upstream_with(FAMILY, format!("failed to parse API response: {e}"), e)
        })
    }
}
