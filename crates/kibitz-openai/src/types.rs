// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI Responses API request, response and stream event types.

use serde::{Deserialize, Serialize};

/// A request to `POST /v1/responses`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    /// The whole prompt as a single user input.
    pub input: String,
    pub reasoning: ReasoningConfig,
    pub stream: bool,
}

/// Reasoning controls for o-series models.
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningConfig {
    pub effort: String,
    /// Requests reasoning summaries, the only reasoning text the API exposes.
    pub summary: String,
}

/// A response object, returned whole or carried by terminal stream events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<ResponsesUsage>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

/// One item of a response's `output` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Reasoning {
        #[serde(default)]
        summary: Vec<TextPart>,
    },
    Message {
        #[serde(default)]
        content: Vec<TextPart>,
    },
    #[serde(other)]
    Other,
}

/// A summary or content part. Refusal parts carry no `text`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsesUsage {
    #[serde(default)]
    pub output_tokens: Option<i64>,
    #[serde(default)]
    pub output_tokens_details: Option<OutputTokensDetails>,
}

impl ResponsesUsage {
    /// Reasoning-only token count, when reported.
    pub fn reasoning_tokens(&self) -> Option<i64> {
        self.output_tokens_details
            .as_ref()
            .and_then(|d| d.reasoning_tokens)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputTokensDetails {
    #[serde(default)]
    pub reasoning_tokens: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Typed events of the Responses streaming protocol, keyed by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ResponsesEvent {
    #[serde(rename = "response.reasoning_summary_text.delta")]
    ReasoningSummaryDelta { delta: String },
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta { delta: String },
    #[serde(rename = "response.completed")]
    Completed { response: ResponseObject },
    #[serde(rename = "response.failed")]
    Failed { response: ResponseObject },
    #[serde(rename = "response.incomplete")]
    Incomplete { response: ResponseObject },
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        code: Option<String>,
        message: String,
    },
    /// Lifecycle, `.done` and item events carry nothing new.
    #[serde(other)]
    Other,
}

/// Error envelope of a rejected request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_request() {
        let req = ResponsesRequest {
            model: "o4-mini".into(),
            input: "Your move.".into(),
            reasoning: ReasoningConfig {
                effort: "low".into(),
                summary: "detailed".into(),
            },
            stream: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "o4-mini",
                "input": "Your move.",
                "reasoning": {"effort": "low", "summary": "detailed"},
                "stream": true
            })
        );
    }

    #[test]
    fn completed_event_exposes_reasoning_tokens() {
        let event: ResponsesEvent = serde_json::from_str(
            r#"{"type":"response.completed","sequence_number":9,"response":{"id":"resp_1","status":"completed","output":[],"usage":{"input_tokens":80,"output_tokens":120,"output_tokens_details":{"reasoning_tokens":64}}}}"#,
        )
        .unwrap();
        match event {
            ResponsesEvent::Completed { response } => {
                assert_eq!(response.usage.unwrap().reasoning_tokens(), Some(64));
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn unknown_event_types_are_other() {
        let event: ResponsesEvent = serde_json::from_str(
            r#"{"type":"response.reasoning_summary_part.added","item_id":"rs_1"}"#,
        )
        .unwrap();
        assert!(matches!(event, ResponsesEvent::Other));
    }

    #[test]
    fn output_items_parse_reasoning_and_message() {
        let response: ResponseObject = serde_json::from_str(
            r#"{"output":[
                {"type":"reasoning","id":"rs","summary":[{"type":"summary_text","text":"Develop."}]},
                {"type":"message","id":"msg","role":"assistant","content":[{"type":"output_text","text":"Nf3","annotations":[]}]},
                {"type":"web_search_call","id":"ws"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            response.output,
            vec![
                OutputItem::Reasoning {
                    summary: vec![TextPart {
                        text: "Develop.".into()
                    }]
                },
                OutputItem::Message {
                    content: vec![TextPart { text: "Nf3".into() }]
                },
                OutputItem::Other,
            ]
        );
    }
}
