// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates for the two exchange kinds.

use kibitz_core::ExchangeKind;

const EMPTY_HISTORY: &str = "No moves yet";

/// A game position as supplied by the caller. Never validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Board state in FEN.
    pub fen: String,
    /// Moves played so far, oldest first.
    pub move_history: Vec<String>,
}

impl Position {
    pub fn new(fen: impl Into<String>, move_history: Vec<String>) -> Self {
        Self {
            fen: fen.into(),
            move_history,
        }
    }

    fn history_line(&self) -> String {
        if self.move_history.is_empty() {
            EMPTY_HISTORY.to_string()
        } else {
            self.move_history.join(", ")
        }
    }

    /// Renders the prompt text for `exchange`.
    pub fn render_prompt(&self, exchange: ExchangeKind) -> String {
        match exchange {
            ExchangeKind::MoveExchange => self.move_prompt(),
            ExchangeKind::DrawExchange => self.draw_prompt(),
        }
    }

    fn move_prompt(&self) -> String {
        format!(
            r#"You are a chess engine. Find the best legal move for the side to move.

<game_state_fen>
{fen}
</game_state_fen>

<move_history>
{history}
</move_history>

Study the position and the course of the game. Weigh material, piece activity,
king safety, pawn structure and control of the center, then pick your move.

Offer a draw only if the position is dead equal, nothing has changed for several
moves, or neither side has enough material to win. Resign only if you are lost
beyond any reasonable defence.

Respond with exactly one of:
- a move in standard algebraic notation (for example "e4", "Nf3", "O-O")
- "RESIGN"
- "DRAW_OFFER"

Do not add any explanation or commentary."#,
            fen = self.fen,
            history = self.history_line(),
        )
    }

    fn draw_prompt(&self) -> String {
        format!(
            r#"You are a chess AI. Your opponent has offered you a draw.

Game State (FEN): {fen}
Move History: {history}

Respond with either "ACCEPT" to accept the draw offer or "DECLINE" to decline and continue playing."#,
            fen = self.fen,
            history = self.history_line(),
        )
    }
}
