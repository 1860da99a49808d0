// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire encoding of canonical events for SSE delivery.
//!
//! Every event but `Done` is a JSON object tagged by `type`. `Done` is the
//! literal `[DONE]` sentinel so line-oriented clients can stop reading.

use crate::types::CanonicalEvent;

/// Sentinel carried by the final frame of a successful stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Encodes one event as the payload of an SSE `data:` line.
pub fn encode(event: &CanonicalEvent) -> String {
    match event {
        CanonicalEvent::Done => DONE_SENTINEL.to_string(),
        other => match serde_json::to_string(other) {
            Ok(json) => json,
            // Only reachable if a ruling fails to serialize, which its
            // plain-string fields cannot.
            Err(e) => encode_failure(&e.to_string()),
        },
    }
}

fn encode_failure(detail: &str) -> String {
    serde_json::json!({
        "type": "error",
        "message": format!("encode failed: {detail}"),
    })
    .to_string()
}

/// Formats one event as a complete SSE frame, trailing blank line included.
pub fn frame(event: &CanonicalEvent) -> String {
    format!("data: {}\n\n", encode(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Decision, Ruling, Verdict};

    #[test]
    fn done_is_the_sentinel() {
        assert_eq!(encode(&CanonicalEvent::Done), "[DONE]");
        assert_eq!(frame(&CanonicalEvent::Done), "data: [DONE]\n\n");
    }

    #[test]
    fn markers_carry_only_their_type() {
        assert_eq!(
            encode(&CanonicalEvent::ThinkingStart),
            r#"{"type":"thinking_start"}"#
        );
        assert_eq!(
            encode(&CanonicalEvent::ResponseEnd),
            r#"{"type":"response_end"}"#
        );
    }

    #[test]
    fn error_frame_carries_message() {
        let event = CanonicalEvent::Error {
            message: "error calling X.AI API: 502".into(),
        };
        let json: serde_json::Value = serde_json::from_str(&encode(&event)).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "error calling X.AI API: 502");
    }

    #[test]
    fn encode_failure_escapes_its_detail() {
        let text = encode_failure(r#"key "x" must be a string"#);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(
            json["message"],
            r#"encode failed: key "x" must be a string"#
        );
    }

    #[test]
    fn result_frame_is_a_single_line() {
        let event = CanonicalEvent::Result {
            ruling: Ruling {
                verdict: Verdict::Move(Decision::Move {
                    notation: "e4".into(),
                }),
                reasoning_cost: 5,
            },
        };
        let frame = frame(&event);
        assert!(frame.starts_with("data: {"));
        assert_eq!(frame.matches('\n').count(), 2);
        assert!(frame.contains(r#""data":{"move":"e4","reasoning_cost":5}"#));
    }
}
