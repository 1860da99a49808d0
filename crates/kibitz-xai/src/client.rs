// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the xAI chat completions endpoint.

use std::time::Duration;

use kibitz_core::{KibitzError, ProviderFamily, RawStream};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::{debug, warn};

use crate::sse;
use crate::types::{ApiErrorResponse, ChatCompletion, ChatRequest, XaiEvent};

const FAMILY: ProviderFamily = ProviderFamily::Xai;

/// HTTP client for xAI. Idle connections are not pooled.
#[derive(Debug, Clone)]
pub struct XaiClient {
    http: reqwest::Client,
    completions_url: String,
}

impl XaiClient {
    pub fn new(base_url: &str) -> Result<Self, KibitzError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                KibitzError::upstream_with(FAMILY, format!("failed to build HTTP client: {e}"), e)
            })?;

        Ok(Self {
            http,
            completions_url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    async fn send(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<reqwest::Response, KibitzError> {
        let auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| KibitzError::Config(format!("invalid xAI API key header value: {e}")))?;

        let response = self
            .http
            .post(&self.completions_url)
            .header(AUTHORIZATION, auth)
            .json(request)
            .send()
            .await
            .map_err(|e| KibitzError::upstream_with(FAMILY, format!("HTTP request failed: {e}"), e))?;

        let status = response.status();
        debug!(status = %status, stream = request.stream, "xAI response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!("{api_err} (HTTP {status})"),
            Err(_) => format!("API returned {status}: {body}"),
        };
        warn!(status = %status, "xAI request rejected");
        Err(KibitzError::upstream(FAMILY, message))
    }

    /// Sends a streaming request and returns the chunk stream.
    pub async fn stream_completion(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<RawStream<XaiEvent>, KibitzError> {
        Ok(sse::parse_sse_stream(self.send(api_key, request).await?))
    }

    /// Sends a unary request.
    pub async fn create_completion(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<ChatCompletion, KibitzError> {
        let response = self.send(api_key, request).await?;
        response.json::<ChatCompletion>().await.map_err(|e| {
            KibitzError::upstream_with(FAMILY, format!("failed to parse API response: {e}"), e)
        })
    }
}
