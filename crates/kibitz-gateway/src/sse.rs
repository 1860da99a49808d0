// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events streaming for POST /get_move_stream.
//!
//! Each canonical event becomes one `data:` frame in its wire encoding:
//! ```text
//! data: {"type":"thinking_delta","content":"..."}
//!
//! data: {"type":"result","data":{"move":"e4","reasoning_cost":5}}
//!
//! data: [DONE]
//! ```
//! A failed exchange ends with a single `{"type":"error",...}` frame instead.
//! If the client goes away, the response stream is dropped and the provider
//! exchange with it.

use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use kibitz_core::ExchangeKind;
use kibitz_core::wire::encode;

use crate::error::ApiError;
use crate::handlers::MoveRequest;
use crate::server::GatewayState;

/// POST /get_move_stream
///
/// Unknown models are rejected with a plain JSON error before the stream starts.
pub async fn post_get_move_stream(
    State(state): State<GatewayState>,
    Json(body): Json<MoveRequest>,
) -> Result<Response, ApiError> {
    let orchestrator = &state.orchestrator;
    let request = orchestrator.prepare(
        &body.model,
        &body.position(),
        ExchangeKind::MoveExchange,
        true,
    )?;

    let events = orchestrator
        .stream(request, orchestrator.default_deadline())
        .map(|event| Ok::<_, Infallible>(Event::default().data(encode(&event))));

    Ok(Sse::new(events).into_response())
}
