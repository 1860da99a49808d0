// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI provider adapter for Kibitz, built on the Responses API.
//!
//! Reasoning arrives as summary text deltas and the answer as output text
//! deltas. `response.completed` is the terminal signal and carries the
//! reasoning-only token count.

pub mod client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use futures::stream;
use kibitz_config::model::OpenAiConfig;
use kibitz_core::credentials::resolve_api_key;
use kibitz_core::{
    CanonicalEvent, Capabilities, Flow, KibitzError, ProgressStream, ProviderAdapter,
    ProviderFamily, ProviderRequest, RawStream, Transcript, Translator, drive,
};
use tracing::{debug, info, warn};

use crate::client::OpenAiClient;
use crate::types::{OutputItem, ReasoningConfig, ResponseObject, ResponsesEvent, ResponsesRequest};

const FAMILY: ProviderFamily = ProviderFamily::OpenAi;

/// Translator for the Responses streaming protocol.
#[derive(Debug, Default)]
pub struct OpenAiTranslator {
    transcript: Transcript,
}

impl OpenAiTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_usage(&mut self, response: &ResponseObject) {
        let reported = response.usage.as_ref().and_then(|u| u.reasoning_tokens());
        let reported = match reported {
            // Zero alongside visible reasoning means the count was not filled in.
            Some(0) if !self.transcript.thinking_text().is_empty() => {
                warn!("discarding zero reasoning token count reported alongside reasoning text");
                None
            }
            other => other,
        };
        self.transcript.report_reasoning(reported);
    }
}

fn failure_message(response: &ResponseObject, fallback: &str) -> String {
    match &response.error {
        Some(err) => err.to_string(),
        None => fallback.to_string(),
    }
}

impl Translator for OpenAiTranslator {
    type Raw = ResponsesEvent;

    fn translate(
        &mut self,
        raw: ResponsesEvent,
        out: &mut Vec<CanonicalEvent>,
    ) -> Result<Flow, KibitzError> {
        match raw {
            ResponsesEvent::ReasoningSummaryDelta { delta } => {
                self.transcript.thinking(&delta, out);
            }
            ResponsesEvent::OutputTextDelta { delta } => self.transcript.response(&delta, out),
            ResponsesEvent::Completed { response } => {
                self.record_usage(&response);
                return Ok(Flow::Finished);
            }
            ResponsesEvent::Failed { response } => {
                return Err(KibitzError::upstream(
                    FAMILY,
                    failure_message(&response, "response failed"),
                ));
            }
            ResponsesEvent::Incomplete { response } => {
                let reason = response
                    .incomplete_details
                    .and_then(|d| d.reason)
                    .unwrap_or_else(|| "unknown".to_string());
                return Err(KibitzError::upstream(
                    FAMILY,
                    format!("response incomplete: {reason}"),
                ));
            }
            ResponsesEvent::Error { code, message } => {
                let message = match code {
                    Some(code) => format!("{code}: {message}"),
                    None => message,
                };
                return Err(KibitzError::upstream(FAMILY, message));
            }
            ResponsesEvent::Other => {}
        }
        Ok(Flow::Continue)
    }

    fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }
}

/// Replays a whole response as summary deltas, output deltas and a completion.
fn synthesize(mut response: ResponseObject) -> Result<Vec<ResponsesEvent>, KibitzError> {
    let has_answer = response.output.iter().any(|item| {
        matches!(item, OutputItem::Message { content } if content.iter().any(|p| !p.text.is_empty()))
    });
    if !has_answer {
        return Err(KibitzError::upstream(FAMILY, "no message content in response"));
    }

    let mut events = Vec::new();
    for item in std::mem::take(&mut response.output) {
        match item {
            OutputItem::Reasoning { summary } => events.extend(
                summary
                    .into_iter()
                    .map(|part| ResponsesEvent::ReasoningSummaryDelta { delta: part.text }),
            ),
            OutputItem::Message { content } => events.extend(
                content
                    .into_iter()
                    .map(|part| ResponsesEvent::OutputTextDelta { delta: part.text }),
            ),
            OutputItem::Other => {}
        }
    }
    events.push(ResponsesEvent::Completed { response });
    Ok(events)
}

/// OpenAI provider implementing [`ProviderAdapter`].
pub struct OpenAiProvider {
    client: OpenAiClient,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Result<Self, KibitzError> {
        let client = OpenAiClient::new(&config.base_url)?;
        info!(
            base_url = %config.base_url,
            effort = %config.reasoning_effort,
            "OpenAI provider initialized"
        );
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn to_responses_request(&self, request: &ProviderRequest) -> ResponsesRequest {
        ResponsesRequest {
            model: request.model.clone(),
            input: request.prompt.clone(),
            reasoning: ReasoningConfig {
                effort: self.config.reasoning_effort.clone(),
                summary: self.config.reasoning_summary.clone(),
            },
            stream: request.stream,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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
        let body = self.to_responses_request(request);
        debug!(model = %request.model, stream = request.stream, "opening OpenAI exchange");

        let raw: RawStream<ResponsesEvent> = if request.stream {
            self.client.stream_response(&api_key, &body).await?
        } else {
            let response = self.client.create_response(&api_key, &body).await?;
            Box::pin(stream::iter(synthesize(response)?.into_iter().map(Ok)))
        };

        Ok(drive(raw, OpenAiTranslator::new()))
    }
}
