// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Responses API.

use std::time::Duration;

use kibitz_core::{KibitzError, ProviderFamily, RawStream};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::{debug, warn};

use crate::sse;
use crate::types::{ApiErrorResponse, ResponseObject, ResponsesEvent, ResponsesRequest};

const FAMILY: ProviderFamily = ProviderFamily::OpenAi;

/// HTTP client for the Responses endpoint. Idle connections are not pooled.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    responses_url: String,
}

impl OpenAiClient {
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
            responses_url: format!("{}/v1/responses", base_url.trim_end_matches('/')),
        })
    }

    async fn send(
        &self,
        api_key: &str,
        request: &ResponsesRequest,
    ) -> Result<reqwest::Response, KibitzError> {
        let auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| KibitzError::Config(format!("invalid OpenAI API key header value: {e}")))?;

        let response = self
            .http
            .post(&self.responses_url)
            .header(AUTHORIZATION, auth)
            .json(request)
            .send()
            .await
            .map_err(|e| KibitzError::upstream_with(FAMILY, format!("HTTP request failed: {e}"), e))?;

        let status = response.status();
        debug!(status = %status, stream = request.stream, "OpenAI response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!("{} (HTTP {status})", api_err.error),
            Err(_) => format!("API returned {status}: {body}"),
        };
        warn!(status = %status, "OpenAI request rejected");
        Err(KibitzError::upstream(FAMILY, message))
    }

    /// Sends a streaming request and returns the typed event stream.
    pub async fn stream_response(
        &self,
        api_key: &str,
        request: &ResponsesRequest,
    ) -> Result<RawStream<ResponsesEvent>, KibitzError> {
        Ok(sse::parse_sse_stream(self.send(api_key, request).await?))
    }

    /// Sends a non-streaming request and returns the whole response object.
    pub async fn create_response(
        &self,
        api_key: &str,
        request: &ResponsesRequest,
    ) -> Result<ResponseObject, KibitzError> {
        let response = self.send(api_key, request).await?;
        response.json::<ResponseObject>().await.map_err(|e| {
            KibitzError::upstream_with(FAMILY, format!("failed to parse API response: {e}"), e)
        })
    }
}
