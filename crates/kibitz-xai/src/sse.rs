// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for streaming chat completions.

use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use kibitz_core::wire::DONE_SENTINEL;
use kibitz_core::{KibitzError, ProviderFamily, RawStream};

use crate::types::{ChatChunk, XaiEvent};

/// Parses a reqwest streaming response into [`XaiEvent`]s.
pub fn parse_sse_stream(response: reqwest::Response) -> RawStream<XaiEvent> {
    let mapped = response
        .bytes_stream()
        .eventsource()
        .filter_map(|result| async move {
            match result {
                Ok(event) if event.data.trim().is_empty() => None,
                Ok(event) if event.data.trim() == DONE_SENTINEL => Some(Ok(XaiEvent::Done)),
                Ok(event) => Some(
                    serde_json::from_str::<ChatChunk>(&event.data)
                        .map(XaiEvent::Chunk)
                        .map_err(|e| {
                            KibitzError::upstream_with(
                                ProviderFamily::Xai,
                                format!("failed to parse stream chunk: {e}"),
                                e,
                            )
                        }),
                ),
                Err(e) => Some(Err(KibitzError::upstream(
                    ProviderFamily::Xai,
                    format!("SSE stream error: {e}"),
                ))),
            }
        });

    Box::pin(mapped)
}
