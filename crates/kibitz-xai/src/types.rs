// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! xAI chat completions request and response types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub reasoning_effort: String,
    pub temperature: f32,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamOptions {
    pub include_usage: bool,
}

// --- Streaming ---

/// One `chat.completion.chunk`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,
    /// `stop` on a normal finish; `length` means the answer was truncated.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Raw event of the streaming protocol.
#[derive(Debug, Clone)]
pub enum XaiEvent {
    Chunk(ChatChunk),
    /// The `data: [DONE]` terminator.
    Done,
}

// --- Unary ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Delta,
}

// --- Usage ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionTokensDetails {
    #[serde(default)]
    pub reasoning_tokens: Option<i64>,
}

impl ChatUsage {
    /// Reasoning-only token count, when reported.
    pub fn reasoning_tokens(&self) -> Option<i64> {
        self.completion_tokens_details
            .as_ref()
            .and_then(|d| d.reasoning_tokens)
    }
}

// --- Errors ---

/// Error body of a rejected request. xAI uses a flat shape, while some
/// proxies return the nested OpenAI one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorResponse {
    Nested { error: ApiErrorDetail },
    Flat {
        error: String,
        #[serde(default)]
        code: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nested { error } => f.write_str(&error.message),
            Self::Flat {
                error,
                code: Some(code),
            } => write!(f, "{code}: {error}"),
            Self::Flat { error, code: None } => f.write_str(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_streaming_request() {
        let req = ChatRequest {
            model: "grok-3-mini".into(),
            messages: vec![ChatMessage::system("Be brief."), ChatMessage::user("Your move.")],
            reasoning_effort: "low".into(),
            temperature: 0.5,
            stream: true,
            stream_options: Some(StreamOptions {
                include_usage: true,
            }),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Your move.");
        assert_eq!(json["reasoning_effort"], "low");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["stream_options"]["include_usage"], true);
    }

    #[test]
    fn unary_request_omits_stream_options() {
        let req = ChatRequest {
            model: "grok-3-mini".into(),
            messages: vec![],
            reasoning_effort: "low".into(),
            temperature: 0.5,
            stream: false,
            stream_options: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("stream_options").is_none());
    }

    #[test]
    fn deserialize_reasoning_chunk() {
        let json = r#"{"id":"c1","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"role":"assistant","reasoning_content":"Hmm"}}]}"#;
        let chunk: ChatChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.choices[0].delta.reasoning_content.as_deref(), Some("Hmm"));
        assert!(chunk.choices[0].delta.content.is_none());
        assert!(chunk.usage.is_none());
    }

    #[test]
    fn deserialize_usage_only_chunk() {
        let json = r#"{"choices":[],"usage":{"prompt_tokens":30,"completion_tokens":9,"completion_tokens_details":{"reasoning_tokens":7}}}"#;
        let chunk: ChatChunk = serde_json::from_str(json).unwrap();
        assert!(chunk.choices.is_empty());
        assert_eq!(chunk.usage.unwrap().reasoning_tokens(), Some(7));
    }

    #[test]
    fn deserialize_completion() {
        let json = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"e4","reasoning_content":"Center."},"finish_reason":"stop"}],"usage":{"completion_tokens":5}}"#;
        let completion: ChatCompletion = serde_json::from_str(json).unwrap();
        assert_eq!(completion.choices[0].message.content.as_deref(), Some("e4"));
        assert_eq!(completion.usage.unwrap().reasoning_tokens(), None);
    }

    #[test]
    fn error_shapes() {
        let flat: ApiErrorResponse = serde_json::from_str(
            r#"{"code":"Client specified an invalid argument","error":"Incorrect API key provided"}"#,
        )
        .unwrap();
        assert_eq!(
            flat.to_string(),
            "Client specified an invalid argument: Incorrect API key provided"
        );

        let nested: ApiErrorResponse =
            serde_json::from_str(r#"{"error":{"message":"model not found","type":"invalid_request_error"}}"#)
                .unwrap();
        assert_eq!(nested.to_string(), "model not found");
    }
}
