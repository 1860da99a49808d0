// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kibitz ask`: runs one exchange from the command line.
//!
//! Streams print one SSE frame per canonical event, exactly as the gateway
//! would send them. `--no-stream` prints the final ruling as JSON.

use std::io::Write;

use clap::Args;
use futures::StreamExt;
use kibitz_config::KibitzConfig;
use kibitz_core::wire::frame;
use kibitz_core::{CanonicalEvent, ExchangeKind, KibitzError};
use kibitz_engine::{Orchestrator, Position};

use crate::serve::init_tracing;

/// Arguments for `kibitz ask`.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Model id from the configured allow-list.
    #[arg(long)]
    pub model: String,

    /// Board position in FEN.
    #[arg(long)]
    pub fen: String,

    /// Space-separated move history, oldest first.
    #[arg(long, default_value = "")]
    pub history: String,

    /// Ask whether to accept a draw offer instead of asking for a move.
    #[arg(long)]
    pub draw: bool,

    /// Request a single unary response and print only the ruling.
    #[arg(long)]
    pub no_stream: bool,
}

impl AskArgs {
    pub fn move_history(&self) -> Vec<String> {
        self.history.split_whitespace().map(String::from).collect()
    }

    fn exchange(&self) -> ExchangeKind {
        if self.draw {
            ExchangeKind::DrawExchange
        } else {
            ExchangeKind::MoveExchange
        }
    }
}

/// Runs the exchange. Returns `Ok(false)` when a stream ended in an error frame.
pub async fn run_ask(config: KibitzConfig, args: AskArgs) -> Result<bool, KibitzError> {
    init_tracing("warn");

    let orchestrator = Orchestrator::from_config(&config)?;
    let position = Position::new(args.fen.clone(), args.move_history());
    let request = orchestrator.prepare(&args.model, &position, args.exchange(), !args.no_stream)?;
    let deadline = orchestrator.default_deadline();

    let mut stdout = std::io::stdout();
    let io_err = |e: std::io::Error| KibitzError::Internal(format!("failed to write output: {e}"));

    if args.no_stream {
        let ruling = orchestrator.decide(request, deadline).await?;
        let json = serde_json::to_string(&ruling)
            .map_err(|e| KibitzError::Internal(format!("failed to encode ruling: {e}")))?;
        writeln!(stdout, "{json}").map_err(io_err)?;
        return Ok(true);
    }

    let mut events = orchestrator.stream(request, deadline);
    let mut succeeded = false;
    while let Some(event) = events.next().await {
        succeeded = event == CanonicalEvent::Done;
        stdout.write_all(frame(&event).as_bytes()).map_err(io_err)?;
        stdout.flush().map_err(io_err)?;
    }
    Ok(succeeded)
}
