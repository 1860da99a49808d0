// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for Responses API streaming.
//!
//! Every event's JSON payload carries its own `type`, so the SSE event name
//! is not consulted.

use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use kibitz_core::{KibitzError, ProviderFamily, RawStream};

use crate::types::ResponsesEvent;

/// Parses a reqwest streaming response into typed [`ResponsesEvent`]s.
pub fn parse_sse_stream(response: reqwest::Response) -> RawStream<ResponsesEvent> {
    let mapped = response
        .bytes_stream()
        .eventsource()
        .filter_map(|result| async move {
            match result {
                Ok(event) if event.data.is_empty() || event.data == "[DONE]" => None,
                Ok(event) => Some(
                    serde_json::from_str::<ResponsesEvent>(&event.data).map_err(|e| {
                        KibitzError::upstream_with(
                            ProviderFamily::OpenAi,
                            format!("failed to parse stream event: {e}"),
                            e,
                        )
                    }),
                ),
                Err(e) => Some(Err(KibitzError::upstream(
                    ProviderFamily::OpenAi,
                    format!("SSE stream error: {e}"),
                ))),
            }
        });

    Box::pin(mapped)
}
