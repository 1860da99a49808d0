// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic's named server-sent events, decoded into [`StreamEvent`]s.

use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use kibitz_core::{KibitzError, ProviderFamily, RawStream};
use serde::de::DeserializeOwned;

use crate::types::{SseContentBlockDelta, SseContentBlockStart, SseError, SseMessageDelta};

/// The Messages stream events the translator cares about.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A new content block begins; its type decides how later deltas route.
    ContentBlockStart(SseContentBlockStart),
    /// Incremental update to a content block.
    ContentBlockDelta(SseContentBlockDelta),
    /// Carries the stop reason and cumulative output usage.
    MessageDelta(SseMessageDelta),
    /// Terminal signal.
    MessageStop,
    /// In-band failure reported after the stream opened.
    Error(SseError),
    /// `message_start`, `content_block_stop` and `ping`.
    Ignored,
}

fn parse<T: DeserializeOwned>(name: &str, data: &str) -> Result<T, KibitzError> {
    serde_json::from_str(data).map_err(|e| {
        KibitzError::upstream_with(
            ProviderFamily::Anthropic,
            format!("failed to parse {name}: {e}"),
            e,
        )
    })
}

/// Decodes each event by its `event:` name. Names this crate does not know
/// are dropped, since Anthropic may add event types at any time.
pub fn parse_sse_stream(response: reqwest::Response) -> RawStream<StreamEvent> {
    let mapped = response
        .bytes_stream()
        .eventsource()
        .filter_map(|result| async move {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    return Some(Err(KibitzError::upstream(
                        ProviderFamily::Anthropic,
                        format!("SSE stream error: {e}"),
                    )));
                }
            };
            let data = event.data.as_str();
            let parsed = match event.event.as_str() {
                "content_block_start" => {
                    parse(&event.event, data).map(StreamEvent::ContentBlockStart)
                }
                "content_block_delta" => {
                    parse(&event.event, data).map(StreamEvent::ContentBlockDelta)
                }
                "message_delta" => parse(&event.event, data).map(StreamEvent::MessageDelta),
                "message_stop" => Ok(StreamEvent::MessageStop),
                "error" => parse(&event.event, data).map(StreamEvent::Error),
                "message_start" | "content_block_stop" | "ping" => Ok(StreamEvent::Ignored),
                _ => return None,
            };
            Some(parsed)
        });

    Box::pin(mapped)
}
