// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! xAI provider adapter for Kibitz, built on chat completions.
//!
//! Reasoning arrives in `delta.reasoning_content` and the answer in
//! `delta.content`. The exchange always opens in the reasoning phase, and
//! `data: [DONE]` (or the end of the stream) is the terminal signal.

pub mod client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use futures::stream;
use kibitz_config::model::XaiConfig;
use kibitz_core::credentials::resolve_api_key;
use kibitz_core::{
    CanonicalEvent, Capabilities, Flow, KibitzError, ProgressStream, ProviderAdapter,
    ProviderFamily, ProviderRequest, RawStream, Transcript, Translator, drive,
};
use tracing::{debug, info, warn};

use crate::client::XaiClient;
use crate::types::{
    ChatChunk, ChatCompletion, ChatMessage, ChatRequest, ChunkChoice, StreamOptions, XaiEvent,
};

const FAMILY: ProviderFamily = ProviderFamily::Xai;

/// Translator for streaming chat completion chunks.
#[derive(Debug, Default)]
pub struct XaiTranslator {
    transcript: Transcript,
}

impl XaiTranslator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Translator for XaiTranslator {
    type Raw = XaiEvent;

    fn opening(&mut self, out: &mut Vec<CanonicalEvent>) {
        self.transcript.begin_thinking(out);
    }

    fn translate(
        &mut self,
        raw: XaiEvent,
        out: &mut Vec<CanonicalEvent>,
    ) -> Result<Flow, KibitzError> {
        let chunk = match raw {
            XaiEvent::Chunk(chunk) => chunk,
            XaiEvent::Done => return Ok(Flow::Finished),
        };

        if let Some(choice) = chunk.choices.first() {
            if let Some(reasoning) = choice.delta.reasoning_content.as_deref() {
                self.transcript.thinking(reasoning, out);
            }
            if let Some(content) = choice.delta.content.as_deref() {
                self.transcript.response(content, out);
            }
            if let Some(reason) = choice.finish_reason.as_deref()
                && reason != "stop"
            {
                warn!(reason, "completion finished early, answer may be incomplete");
            }
        }

        if let Some(usage) = &chunk.usage {
            self.transcript.report_reasoning(usage.reasoning_tokens());
        }
        Ok(Flow::Continue)
    }

    fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }
}

/// Replays a whole completion as a single chunk followed by `[DONE]`.
fn synthesize(completion: ChatCompletion) -> Result<Vec<XaiEvent>, KibitzError> {
    let ChatCompletion { choices, usage } = completion;
    let Some(message) = choices.into_iter().next().map(|c| c.message) else {
        return Err(KibitzError::upstream(FAMILY, "no choices in response"));
    };
    if message.content.as_deref().is_none_or(str::is_empty) {
        return Err(KibitzError::upstream(FAMILY, "no content in response"));
    }

    let chunk = ChatChunk {
        choices: vec![ChunkChoice {
            delta: message,
            finish_reason: Some("stop".to_string()),
        }],
        usage,
    };
    Ok(vec![XaiEvent::Chunk(chunk), XaiEvent::Done])
}

/// xAI provider implementing [`ProviderAdapter`].
pub struct XaiProvider {
    client: XaiClient,
    config: XaiConfig,
}

impl XaiProvider {
    pub fn new(config: &XaiConfig) -> Result<Self, KibitzError> {
        let client = XaiClient::new(&config.base_url)?;
        info!(
            base_url = %config.base_url,
            effort = %config.reasoning_effort,
            "xAI provider initialized"
        );
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn to_chat_request(&self, request: &ProviderRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage::system(self.config.system_prompt.clone()),
                ChatMessage::user(request.prompt.clone()),
            ],
            reasoning_effort: self.config.reasoning_effort.clone(),
            temperature: self.config.temperature,
            stream: request.stream,
            stream_options: request.stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }
}

#[async_trait]
impl ProviderAdapter for XaiProvider {
    fn name(&self) -> &str {
        "xai"
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
        let body = self.to_chat_request(request);
        debug!(model = %request.model, stream = request.stream, "opening xAI exchange");

        let raw: RawStream<XaiEvent> = if request.stream {
            self.client.stream_completion(&api_key, &body).await?
        } else {
            let completion = self.client.create_completion(&api_key, &body).await?;
            Box::pin(stream::iter(synthesize(completion)?.into_iter().map(Ok)))
        };

        Ok(drive(raw, XaiTranslator::new()))
    }
}
