// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort reasoning cost.
//!
//! Providers report reasoning effort in incompatible units, or not at all.
//! A reported non-negative figure always wins; otherwise the cost is derived
//! from the accumulated reasoning text at roughly four characters per token.
//! The answer text never contributes.

/// Characters per estimated token.
const CHARS_PER_TOKEN: usize = 4;

/// Returns the reasoning cost for an exchange.
pub fn estimate(reported: Option<i64>, thinking: &str) -> u64 {
    if let Some(value) = reported
        && value >= 0
    {
        return value as u64;
    }

    let chars = thinking.chars().count();
    if chars == 0 {
        0
    } else {
        (chars / CHARS_PER_TOKEN).max(1) as u64
    }
}
