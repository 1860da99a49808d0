// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for Kibitz.
//!
//! The Messages API multiplexes reasoning and answer text as numbered content
//! blocks. [`AnthropicTranslator`] remembers each block's kind when it starts
//! and routes later deltas by index. The reported `output_tokens` figure
//! covers thinking and answer together, so it is never used as the
//! reasoning cost.

pub mod client;
pub mod sse;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream;
use kibitz_config::model::AnthropicConfig;
use kibitz_core::credentials::resolve_api_key;
use kibitz_core::{
    CanonicalEvent, Capabilities, Flow, KibitzError, ProgressStream, ProviderAdapter,
    ProviderFamily, ProviderRequest, RawStream, Transcript, Translator, drive,
};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::sse::StreamEvent;
use crate::types::{
    ApiMessage, BlockHeader, MessageRequest, MessageResponse, ResponseBlock,
    SseContentBlockDelta, SseContentBlockStart, SseDelta, ThinkingConfig,
};

/// How deltas for one content block are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Thinking,
    Response,
}

impl BlockKind {
    fn of(block_type: &str) -> Self {
        match block_type {
            "thinking" | "redacted_thinking" => Self::Thinking,
            _ => Self::Response,
        }
    }
}

/// Translator for the Anthropic block-multiplexed stream.
#[derive(Debug, Default)]
pub struct AnthropicTranslator {
    transcript: Transcript,
    blocks: HashMap<usize, BlockKind>,
}

impl AnthropicTranslator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Translator for AnthropicTranslator {
    type Raw = StreamEvent;

    fn translate(
        &mut self,
        raw: StreamEvent,
        out: &mut Vec<CanonicalEvent>,
    ) -> Result<Flow, KibitzError> {
        match raw {
            StreamEvent::ContentBlockStart(start) => {
                self.blocks
                    .insert(start.index, BlockKind::of(&start.content_block.block_type));
            }
            StreamEvent::ContentBlockDelta(delta) => match delta.delta {
                SseDelta::ThinkingDelta { thinking } => self.transcript.thinking(&thinking, out),
                SseDelta::TextDelta { text } => match self.blocks.get(&delta.index) {
                    Some(BlockKind::Thinking) => self.transcript.thinking(&text, out),
                    Some(BlockKind::Response) | None => self.transcript.response(&text, out),
                },
                SseDelta::SignatureDelta | SseDelta::Other => {}
            },
            StreamEvent::MessageDelta(md) => {
                if let Some(usage) = md.usage {
                    debug!(
                        output_tokens = usage.output_tokens,
                        "ignoring combined output token count"
                    );
                }
            }
            StreamEvent::MessageStop => return Ok(Flow::Finished),
            StreamEvent::Error(err) => {
                return Err(KibitzError::upstream(
                    ProviderFamily::Anthropic,
                    err.error.to_string(),
                ));
            }
            StreamEvent::Ignored => {}
        }
        Ok(Flow::Continue)
    }

    fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }
}

/// Replays a full response as the block events a stream would have carried.
///
/// Fails when the response holds no answer text.
fn synthesize(response: MessageResponse) -> Result<Vec<StreamEvent>, KibitzError> {
    if !response
        .content
        .iter()
        .any(|b| matches!(b, ResponseBlock::Text { .. }))
    {
        return Err(KibitzError::upstream(
            ProviderFamily::Anthropic,
            "no text content in response",
        ));
    }

    let mut events = Vec::with_capacity(response.content.len() * 2 + 1);
    for (index, block) in response.content.into_iter().enumerate() {
        let (block_type, delta) = match block {
            ResponseBlock::Thinking { thinking } => {
                ("thinking", SseDelta::ThinkingDelta { thinking })
            }
            ResponseBlock::Text { text } => ("text", SseDelta::TextDelta { text }),
            ResponseBlock::RedactedThinking | ResponseBlock::Other => continue,
        };
        events.push(StreamEvent::ContentBlockStart(SseContentBlockStart {
            index,
            content_block: BlockHeader {
                block_type: block_type.to_string(),
            },
        }));
        events.push(StreamEvent::ContentBlockDelta(SseContentBlockDelta {
            index,
            delta,
        }));
    }
    events.push(StreamEvent::MessageStop);
    Ok(events)
}

/// Anthropic Claude provider implementing [`ProviderAdapter`].
///
/// API key resolution happens on every exchange: config -> `ANTHROPIC_API_KEY` -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from its config section.
    pub fn new(config: &AnthropicConfig) -> Result<Self, KibitzError> {
        let client = AnthropicClient::new(&config.base_url, &config.api_version)?;
        info!(
            base_url = %config.base_url,
            thinking_budget = config.thinking_budget,
            "Anthropic provider initialized"
        );
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn to_message_request(&self, request: &ProviderRequest) -> MessageRequest {
        MessageRequest {
            model: request.model.clone(),
            max_tokens: self.config.max_tokens,
            thinking: ThinkingConfig::enabled(self.config.thinking_budget),
            system: Some(self.config.system_prompt.clone()),
            messages: vec![ApiMessage {
                role: "user",
                content: request.prompt.clone(),
            }],
            stream: request.stream,
        }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn family(&self) -> ProviderFamily {
        ProviderFamily::Anthropic
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            streaming: true,
            usage_reporting: false,
        }
    }

    async fn open(&self, request: &ProviderRequest) -> Result<ProgressStream, KibitzError> {
        let api_key = resolve_api_key(ProviderFamily::Anthropic, self.config.api_key.as_deref())?;
        let body = self.to_message_request(request);
        debug!(model = %request.model, stream = request.stream, "opening Anthropic exchange");

        let raw: RawStream<StreamEvent> = if request.stream {
            self.client.stream_message(&api_key, &body).await?
        } else {
            let response = self.client.complete_message(&api_key, &body).await?;
            Box::pin(stream::iter(synthesize(response)?.into_iter().map(Ok)))
        };

        Ok(drive(raw, AnthropicTranslator::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SseError;
    use futures::StreamExt;
    use kibitz_core::{ExchangeKind, Outcome, Progress};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn start(index: usize, block_type: &str) -> StreamEvent {
        StreamEvent::ContentBlockStart(SseContentBlockStart {
            index,
            content_block: BlockHeader {
                block_type: block_type.into(),
            },
        })
    }

    fn delta(index: usize, delta: SseDelta) -> StreamEvent {
        StreamEvent::ContentBlockDelta(SseContentBlockDelta { index, delta })
    }

    fn text(index: usize, text: &str) -> StreamEvent {
        delta(index, SseDelta::TextDelta { text: text.into() })
    }

    fn feed(events: Vec<StreamEvent>) -> (Vec<CanonicalEvent>, Result<Flow, KibitzError>) {
        let mut translator = AnthropicTranslator::new();
        let mut out = Vec::new();
        let mut flow = Ok(Flow::Continue);
        for event in events {
            flow = translator.translate(event, &mut out);
            if !matches!(flow, Ok(Flow::Continue)) {
                break;
            }
        }
        (out, flow)
    }

    #[test]
    fn thinking_block_then_text_block() {
        let (out, flow) = feed(vec![
            start(0, "thinking"),
            delta(
                0,
                SseDelta::ThinkingDelta {
                    thinking: "Let me think".into(),
                },
            ),
            delta(
                0,
                SseDelta::ThinkingDelta {
                    thinking: " about this".into(),
                },
            ),
            delta(0, SseDelta::SignatureDelta),
            start(1, "text"),
            text(1, "e4"),
            StreamEvent::MessageStop,
        ]);
        assert!(matches!(flow, Ok(Flow::Finished)));
        assert_eq!(
            out,
            vec![
                CanonicalEvent::ThinkingStart,
                CanonicalEvent::ThinkingDelta {
                    text: "Let me think".into()
                },
                CanonicalEvent::ThinkingDelta {
                    text: " about this".into()
                },
                CanonicalEvent::ThinkingEnd,
                CanonicalEvent::ResponseStart,
                CanonicalEvent::ResponseDelta { text: "e4".into() },
            ]
        );
    }

    #[test]
    fn text_delta_in_thinking_block_counts_as_thinking() {
        let (out, _) = feed(vec![start(0, "redacted_thinking"), text(0, "hidden")]);
        assert_eq!(
            out,
            vec![
                CanonicalEvent::ThinkingStart,
                CanonicalEvent::ThinkingDelta {
                    text: "hidden".into()
                },
            ]
        );
    }

    #[test]
    fn delta_for_unknown_index_routes_to_response() {
        let (out, _) = feed(vec![text(7, "d4")]);
        assert_eq!(
            out,
            vec![
                CanonicalEvent::ResponseStart,
                CanonicalEvent::ResponseDelta { text: "d4".into() },
            ]
        );
    }

    #[test]
    fn error_event_is_upstream_failure() {
        let err_event: SseError = serde_json::from_str(
            r#"{"error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        )
        .unwrap();
        let (_, flow) = feed(vec![start(0, "text"), StreamEvent::Error(err_event)]);
        let err = flow.unwrap_err();
        assert_eq!(
            err.to_string(),
            "error calling Anthropic API: overloaded_error: Overloaded"
        );
    }

    #[test]
    fn synthesize_requires_text_block() {
        let response = MessageResponse {
            content: vec![ResponseBlock::Thinking {
                thinking: "only thoughts".into(),
            }],
            usage: None,
        };
        let err = synthesize(response).unwrap_err();
        assert!(err.to_string().contains("no text content in response"));
    }

    #[test]
    fn synthesize_replays_blocks_in_order() {
        let response = MessageResponse {
            content: vec![
                ResponseBlock::Thinking {
                    thinking: "hmm".into(),
                },
                ResponseBlock::RedactedThinking,
                ResponseBlock::Text {
                    text: "RESIGN".into(),
                },
            ],
            usage: None,
        };
        let (out, flow) = feed(synthesize(response).unwrap());
        assert!(matches!(flow, Ok(Flow::Finished)));
        assert_eq!(out.len(), 5);
        assert_eq!(out[4], CanonicalEvent::ResponseDelta {
            text: "RESIGN".into()
        });
    }

    fn provider_for(server: &MockServer, api_key: &str) -> AnthropicProvider {
        let config = AnthropicConfig {
            api_key: Some(api_key.into()),
            base_url: server.uri(),
            ..AnthropicConfig::default()
        };
        AnthropicProvider::new(&config).unwrap()
    }

    fn request(stream: bool) -> ProviderRequest {
        ProviderRequest {
            family: ProviderFamily::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            prompt: "Your move.".into(),
            exchange: ExchangeKind::MoveExchange,
            stream,
        }
    }

    async fn run(progress: ProgressStream) -> (Vec<CanonicalEvent>, Option<Outcome>) {
        let items: Vec<_> = progress.collect().await;
        let mut events = Vec::new();
        let mut outcome = None;
        for item in items {
            match item.unwrap() {
                Progress::Event(e) => events.push(e),
                Progress::Finished(o) => outcome = Some(o),
            }
        }
        (events, outcome)
    }

    #[tokio::test]
    async fn streaming_exchange_end_to_end() {
        let server = MockServer::start().await;
        let sse = concat!(
            "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"m\"}}\n\n",
            "event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"thinking\",\"thinking\":\"\"}}\n\n",
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"thinking_delta\",\"thinking\":\"Center.\"}}\n\n",
            "event: content_block_stop\ndata: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
            "event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
            "event: ping\ndata: {\"type\":\"ping\"}\n\n",
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"text_delta\",\"text\":\"e4\"}}\n\n",
            "event: message_delta\ndata: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":300}}\n\n",
            "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({
                "stream": true,
                "max_tokens": 1100,
                "thinking": {"type": "enabled", "budget_tokens": 1024}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server, "sk-test");
        let (events, outcome) = run(provider.open(&request(true)).await.unwrap()).await;

        assert_eq!(events.first(), Some(&CanonicalEvent::ThinkingStart));
        assert_eq!(events.last(), Some(&CanonicalEvent::ResponseEnd));
        let outcome = outcome.unwrap();
        assert_eq!(outcome.thinking, "Center.");
        assert_eq!(outcome.response, "e4");
        assert_eq!(outcome.reported_reasoning, None);
    }

    #[tokio::test]
    async fn non_streaming_exchange_synthesizes_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({"stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "thinking", "thinking": "Trade queens.", "signature": "s"},
                    {"type": "text", "text": " Qxd8+ "}
                ],
                "usage": {"input_tokens": 50, "output_tokens": 90}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, "sk-test");
        let (events, outcome) = run(provider.open(&request(false)).await.unwrap()).await;

        assert_eq!(
            events,
            vec![
                CanonicalEvent::ThinkingStart,
                CanonicalEvent::ThinkingDelta {
                    text: "Trade queens.".into()
                },
                CanonicalEvent::ThinkingEnd,
                CanonicalEvent::ResponseStart,
                CanonicalEvent::ResponseDelta {
                    text: " Qxd8+ ".into()
                },
                CanonicalEvent::ResponseEnd,
            ]
        );
        assert_eq!(outcome.unwrap().response, " Qxd8+ ");
    }

    #[tokio::test]
    async fn rejected_request_fails_on_open() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, "sk-wrong");
        let err = provider.open(&request(true)).await.err().unwrap();
        assert!(err.to_string().contains("authentication_error"));
    }

    #[test]
    fn adapter_metadata() {
        let provider = AnthropicProvider::new(&AnthropicConfig::default()).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.family(), ProviderFamily::Anthropic);
        assert!(!provider.capabilities().usage_reporting);
    }
}
