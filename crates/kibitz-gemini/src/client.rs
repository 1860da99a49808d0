// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` endpoints.

use std::time::Duration;

use kibitz_core::{KibitzError, ProviderFamily, RawStream};
use reqwest::header::HeaderValue;
use tracing::{debug, warn};

use crate::sse;
use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

const FAMILY: ProviderFamily = ProviderFamily::Gemini;

/// HTTP client for Gemini. Idle connections are not pooled.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
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
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, model: &str, streaming: bool) -> String {
        if streaming {
            format!(
                "{}/v1beta/models/{model}:streamGenerateContent?alt=sse",
                self.base_url
            )
        } else {
            format!("{}/v1beta/models/{model}:generateContent", self.base_url)
        }
    }

    async fn send(
        &self,
        api_key: &str,
        url: &str,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response, KibitzError> {
        let api_key = HeaderValue::from_str(api_key)
            .map_err(|e| KibitzError::Config(format!("invalid Gemini API key header value: {e}")))?;

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| KibitzError::upstream_with(FAMILY, format!("HTTP request failed: {e}"), e))?;

        let status = response.status();
        debug!(status = %status, "Gemini response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!("{} (HTTP {status})", api_err.error),
            Err(_) => format!("API returned {status}: {body}"),
        };
        warn!(status = %status, "Gemini request rejected");
        Err(KibitzError::upstream(FAMILY, message))
    }

    /// Opens a streaming exchange.
    pub async fn stream_generate(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<RawStream<GenerateContentResponse>, KibitzError> {
        let response = self.send(api_key, &self.url(model, true), request).await?;
        Ok(sse::parse_sse_stream(response))
    }

    /// Runs a unary exchange.
    pub async fn generate(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, KibitzError> {
        let response = self.send(api_key, &self.url(model, false), request).await?;
        response.json::<GenerateContentResponse>().await.map_err(|e| {
            KibitzError::upstream_with(FAMILY, format!("failed to parse API response: {e}"), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls() {
        let client = GeminiClient::new("https://generativelanguage.googleapis.com/").unwrap();
        assert_eq!(
            client.url("gemini-2.5-pro-preview-05-06", true),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro-preview-05-06:streamGenerateContent?alt=sse"
        );
        assert_eq!(
            client.url("gemini-2.5-flash-preview-05-20", false),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-05-20:generateContent"
        );
    }
}
