// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of a model's final answer into a bounded decision.
//!
//! Only the sentinel values are compared case-insensitively, and always
//! against the fully trimmed answer. A move's notation is returned exactly
//! as trimmed, with no other normalization.

use crate::types::{Decision, DrawDecision, ExchangeKind, Verdict};

const RESIGN: &str = "RESIGN";
const DRAW_OFFER: &str = "DRAW_OFFER";
const ACCEPT: &str = "ACCEPT";

/// Classifies a move-exchange answer.
pub fn classify_move(answer: &str) -> Decision {
    let trimmed = answer.trim();
    if trimmed.eq_ignore_ascii_case(RESIGN) {
        Decision::Resign
    } else if trimmed.eq_ignore_ascii_case(DRAW_OFFER) {
        Decision::DrawOffer
    } else {
        Decision::Move {
            notation: trimmed.to_string(),
        }
    }
}

/// Classifies a draw-exchange answer. Anything but `ACCEPT` declines.
pub fn classify_draw(answer: &str) -> DrawDecision {
    if answer.trim().eq_ignore_ascii_case(ACCEPT) {
        DrawDecision::Accept
    } else {
        DrawDecision::Decline
    }
}

/// Applies the classifier matching the exchange kind.
pub fn classify(exchange: ExchangeKind, answer: &str) -> Verdict {
    match exchange {
        ExchangeKind::MoveExchange => Verdict::Move(classify_move(answer)),
        ExchangeKind::DrawExchange => Verdict::Draw(classify_draw(answer)),
    }
}
