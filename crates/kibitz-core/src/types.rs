// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by provider adapters, translators and the orchestrator.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

/// The provider families Kibitz can broker decisions from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    Anthropic,
    OpenAi,
    Gemini,
    Xai,
}

impl ProviderFamily {
    /// Human-readable API name used in upstream error messages.
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Google Gemini",
            Self::Xai => "X.AI",
        }
    }

    /// Environment variable holding the family's credential.
    pub fn credential_env(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Xai => "XAI_API_KEY",
        }
    }
}

/// Which exchange is being run. The two kinds differ only in prompt template
/// and in how the final answer is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    MoveExchange,
    DrawExchange,
}

/// One inbound exchange. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    /// Provider family that serves `model`.
    pub family: ProviderFamily,
    /// Provider-side model identifier.
    pub model: String,
    /// Fully rendered prompt text.
    pub prompt: String,
    /// Move or draw exchange.
    pub exchange: ExchangeKind,
    /// Request native streaming delivery from the provider.
    pub stream: bool,
}

/// Capability set advertised by an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The provider can deliver the exchange incrementally.
    pub streaming: bool,
    /// The provider reports a reasoning-only usage figure. When false the
    /// orchestrator discards any reported figure and estimates instead.
    pub usage_reporting: bool,
}

/// Provider-agnostic unit of streamed output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanonicalEvent {
    ThinkingStart,
    ThinkingDelta {
        #[serde(rename = "content")]
        text: String,
    },
    ThinkingEnd,
    ResponseStart,
    ResponseDelta {
        #[serde(rename = "content")]
        text: String,
    },
    ResponseEnd,
    Result {
        #[serde(rename = "data")]
        ruling: Ruling,
    },
    Done,
    Error {
        message: String,
    },
}

impl CanonicalEvent {
    /// True for `Done` and `Error`, after which nothing follows.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }
}

/// Classified meaning of a move-exchange answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Move { notation: String },
    Resign,
    DrawOffer,
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Move { notation } => map.serialize_entry("move", notation)?,
            Self::Resign => map.serialize_entry("action", "resign")?,
            Self::DrawOffer => map.serialize_entry("action", "draw_offer")?,
        }
        map.end()
    }
}

/// Classified meaning of a draw-exchange answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawDecision {
    Accept,
    Decline,
}

impl Serialize for DrawDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let action = match self {
            Self::Accept => "draw_accept",
            Self::Decline => "draw_decline",
        };
        map.serialize_entry("action", action)?;
        map.end()
    }
}

/// Either kind of classified answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Verdict {
    Move(Decision),
    Draw(DrawDecision),
}

/// Payload of the terminal `Result` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ruling {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub reasoning_cost: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn provider_family_round_trips_through_strings() {
        for family in [
            ProviderFamily::Anthropic,
            ProviderFamily::OpenAi,
            ProviderFamily::Gemini,
            ProviderFamily::Xai,
        ] {
            let parsed = ProviderFamily::from_str(&family.to_string()).expect("should parse back");
            assert_eq!(parsed, family);
        }
        assert_eq!(ProviderFamily::OpenAi.to_string(), "openai");
        assert_eq!(
            serde_json::to_string(&ProviderFamily::Xai).unwrap(),
            "\"xai\""
        );
    }

    #[test]
    fn delta_events_carry_content_field() {
        let event = CanonicalEvent::ThinkingDelta {
            text: "hmm".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"type": "thinking_delta", "content": "hmm"}));
    }

    #[test]
    fn result_event_nests_ruling_under_data() {
        let event = CanonicalEvent::Result {
            ruling: Ruling {
                verdict: Verdict::Move(Decision::Move {
                    notation: "Nf3".into(),
                }),
                reasoning_cost: 12,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "result", "data": {"move": "Nf3", "reasoning_cost": 12}})
        );
    }

    #[test]
    fn special_decisions_serialize_as_actions() {
        let resign = Ruling {
            verdict: Verdict::Move(Decision::Resign),
            reasoning_cost: 0,
        };
        assert_eq!(
            serde_json::to_value(&resign).unwrap(),
            serde_json::json!({"action": "resign", "reasoning_cost": 0})
        );

        let offer = Ruling {
            verdict: Verdict::Move(Decision::DrawOffer),
            reasoning_cost: 4,
        };
        assert_eq!(
            serde_json::to_value(&offer).unwrap()["action"],
            "draw_offer"
        );

        let accept = Ruling {
            verdict: Verdict::Draw(DrawDecision::Accept),
            reasoning_cost: 1,
        };
        assert_eq!(
            serde_json::to_value(&accept).unwrap(),
            serde_json::json!({"action": "draw_accept", "reasoning_cost": 1})
        );
    }

    #[test]
    fn only_done_and_error_are_terminal() {
        assert!(CanonicalEvent::Done.is_terminal());
        assert!(CanonicalEvent::Error {
            message: "x".into()
        }
        .is_terminal());
        assert!(!CanonicalEvent::ResponseEnd.is_terminal());
    }
}
