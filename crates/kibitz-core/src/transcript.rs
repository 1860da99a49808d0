// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The phase machine every provider translator feeds.
//!
//! [`Transcript`] owns the partial-text accumulators for one exchange and
//! emits the canonical phase markers on its transitions:
//!
//! ```text
//! Idle ──thinking──▶ Thinking ──response──▶ Responding ──finish──▶ Finished
//!   └──────────────────response──────────────────▲
//! ```
//!
//! Each marker is emitted at most once, `ThinkingEnd` only after
//! `ThinkingStart`, and `ResponseEnd` exactly when `ResponseStart` was emitted.

use tracing::debug;

use crate::types::CanonicalEvent;

/// Where a transcript is in the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Thinking,
    Responding,
    Finished,
}

/// Accumulated state handed to the orchestrator once the terminal signal arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Concatenated reasoning text.
    pub thinking: String,
    /// Concatenated answer text.
    pub response: String,
    /// Reasoning-only usage figure reported by the provider, if any.
    pub reported_reasoning: Option<i64>,
}

/// Per-exchange accumulator and phase machine.
#[derive(Debug)]
pub struct Transcript {
    phase: Phase,
    thinking_entered: bool,
    responding_entered: bool,
    outcome: Outcome,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            thinking_entered: false,
            responding_entered: false,
            outcome: Outcome::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Enters the reasoning phase without any text. No-op unless idle.
    pub fn begin_thinking(&mut self, out: &mut Vec<CanonicalEvent>) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Thinking;
            self.thinking_entered = true;
            out.push(CanonicalEvent::ThinkingStart);
        }
    }

    /// Appends reasoning text.
    ///
    /// Reasoning that arrives after the answer has started still counts
    /// toward the cost estimate but is not re-emitted.
    pub fn thinking(&mut self, text: &str, out: &mut Vec<CanonicalEvent>) {
        if text.is_empty() {
            return;
        }
        match self.phase {
            Phase::Idle | Phase::Thinking => {
                self.begin_thinking(out);
                self.outcome.thinking.push_str(text);
                out.push(CanonicalEvent::ThinkingDelta {
                    text: text.to_string(),
                });
            }
            Phase::Responding => {
                debug!(len = text.len(), "late reasoning after answer started");
                self.outcome.thinking.push_str(text);
            }
            Phase::Finished => {}
        }
    }

    /// Appends answer text, closing the reasoning phase on the first delta.
    pub fn response(&mut self, text: &str, out: &mut Vec<CanonicalEvent>) {
        if text.is_empty() {
            return;
        }
        match self.phase {
            Phase::Idle | Phase::Thinking => {
                if self.phase == Phase::Thinking {
                    out.push(CanonicalEvent::ThinkingEnd);
                }
                self.phase = Phase::Responding;
                self.responding_entered = true;
                out.push(CanonicalEvent::ResponseStart);
                self.outcome.response.push_str(text);
                out.push(CanonicalEvent::ResponseDelta {
                    text: text.to_string(),
                });
            }
            Phase::Responding => {
                self.outcome.response.push_str(text);
                out.push(CanonicalEvent::ResponseDelta {
                    text: text.to_string(),
                });
            }
            Phase::Finished => {}
        }
    }

    /// Records a provider-reported reasoning figure. The latest report wins.
    pub fn report_reasoning(&mut self, tokens: Option<i64>) {
        if tokens.is_some() {
            self.outcome.reported_reasoning = tokens;
        }
    }

    /// Thinking text accumulated so far.
    pub fn thinking_text(&self) -> &str {
        &self.outcome.thinking
    }

    /// Closes whatever phase is open. Idempotent.
    pub fn finish(&mut self, out: &mut Vec<CanonicalEvent>) {
        match self.phase {
            Phase::Thinking => out.push(CanonicalEvent::ThinkingEnd),
            Phase::Responding => out.push(CanonicalEvent::ResponseEnd),
            Phase::Idle | Phase::Finished => {}
        }
        self.phase = Phase::Finished;
    }

    /// True once `ThinkingStart` has been emitted.
    pub fn thinking_entered(&self) -> bool {
        self.thinking_entered
    }

    /// True once `ResponseStart` has been emitted.
    pub fn responding_entered(&self) -> bool {
        self.responding_entered
    }

    /// Takes the accumulated state, leaving an empty outcome behind.
    pub fn take_outcome(&mut self) -> Outcome {
        std::mem::take(&mut self.outcome)
    }
}
