// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for `streamGenerateContent?alt=sse`.

use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use kibitz_core::{KibitzError, ProviderFamily, RawStream};

use crate::types::GenerateContentResponse;

/// Parses a reqwest streaming response into response chunks.
pub fn parse_sse_stream(response: reqwest::Response) -> RawStream<GenerateContentResponse> {
    let mapped = response
        .bytes_stream()
        .eventsource()
        .filter_map(|result| async move {
            match result {
                Ok(event) if event.data.trim().is_empty() => None,
                Ok(event) => Some(
                    serde_json::from_str::<GenerateContentResponse>(&event.data).map_err(|e| {
                        KibitzError::upstream_with(
                            ProviderFamily::Gemini,
                            format!("failed to parse stream chunk: {e}"),
                            e,
                        )
                    }),
                ),
                Err(e) => Some(Err(KibitzError::upstream(
                    ProviderFamily::Gemini,
                    format!("SSE stream error: {e}"),
                ))),
            }
        });

    Box::pin(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn mock_sse_response(sse_text: &str) -> reqwest::Response {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_text.to_string()),
            )
            .mount(&server)
            .await;

        reqwest::get(&server.uri()).await.unwrap()
    }

    #[tokio::test]
    async fn parses_data_only_frames() {
        let sse = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"a\",\"thought\":true}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"e4\"}]}}]}\r\n\r\n",
        );
        let chunks: Vec<_> = parse_sse_stream(mock_sse_response(sse).await)
            .collect()
            .await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].as_ref().unwrap().has_answer_text());
    }

    #[tokio::test]
    async fn malformed_chunk_is_an_upstream_error() {
        let mut stream = parse_sse_stream(mock_sse_response("data: [oops\n\n").await);
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.to_string().starts_with("error calling Google Gemini API"));
    }
}
