// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for Kibitz.
//!
//! Gemini interleaves thought parts and answer parts inside each chunk.
//! The exchange always opens in the reasoning phase, and the end of the
//! chunk stream is the terminal signal.

pub mod client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use kibitz_config::model::GeminiConfig;
use kibitz_core::credentials::resolve_api_key;
use kibitz_core::translate;
use kibitz_core::{
    CanonicalEvent, Capabilities, Flow, KibitzError, ProgressStream, ProviderAdapter,
    ProviderFamily, ProviderRequest, RawStream, Transcript, Translator, drive,
};
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ThinkingConfig,
};

const FAMILY: ProviderFamily = ProviderFamily::Gemini;

/// Translator for Gemini response chunks.
#[derive(Debug, Default)]
pub struct GeminiTranslator {
    transcript: Transcript,
}

impl GeminiTranslator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Translator for GeminiTranslator {
    type Raw = GenerateContentResponse;

    fn opening(&mut self, out: &mut Vec<CanonicalEvent>) {
        self.transcript.begin_thinking(out);
    }

    fn translate(
        &mut self,
        chunk: GenerateContentResponse,
        out: &mut Vec<CanonicalEvent>,
    ) -> Result<Flow, KibitzError> {
        if let Some(err) = &chunk.error {
            return Err(KibitzError::upstream(FAMILY, err.to_string()));
        }

        for part in chunk.parts() {
            let Some(text) = part.text.as_deref() else {
                continue;
            };
            if part.is_thought() {
                self.transcript.thinking(text, out);
            } else {
                self.transcript.response(text, out);
            }
        }

        for reason in chunk.candidates.iter().filter_map(|c| c.finish_reason.as_deref()) {
            if reason != "STOP" {
                warn!(reason, "candidate finished early, answer may be incomplete");
            }
        }

        if let Some(usage) = &chunk.usage_metadata {
            self.transcript.report_reasoning(usage.thoughts_token_count);
        }
        Ok(Flow::Continue)
    }

    fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }
}

/// Gemini provider implementing [`ProviderAdapter`].
pub struct GeminiProvider {
    client: GeminiClient,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Result<Self, KibitzError> {
        let client = GeminiClient::new(&config.base_url)?;
        info!(base_url = %config.base_url, "Gemini provider initialized");
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn to_request(&self, request: &ProviderRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(request.prompt.clone())],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig {
                    include_thoughts: self.config.include_thoughts,
                },
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn family(&self) -> ProviderFamily {
        FAMILY
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            streaming: true,
            usage_reporting: true,
        }
    }

    async fn open(&self, request: &ProviderRequest) -> Result<ProgressStream, KibitzError> {
        let api_key = resolve_api_key(FAMILY, self.config.api_key.as_deref())?;
        let body = self.to_request(request);
        debug!(model = %request.model, stream = request.stream, "opening Gemini exchange");

        let raw: RawStream<GenerateContentResponse> = if request.stream {
            self.client
                .stream_generate(&api_key, &request.model, &body)
                .await?
        } else {
            let response = self.client.generate(&api_key, &request.model, &body).await?;
            if !response.has_answer_text() {
                return Err(KibitzError::upstream(FAMILY, "no text in response"));
            }
            translate::once(response)
        };

        Ok(drive(raw, GeminiTranslator::new()))
    }
}
