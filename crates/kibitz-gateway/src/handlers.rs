// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the unary routes.

use axum::Json;
use axum::extract::State;
use kibitz_core::{ExchangeKind, Ruling};
use kibitz_engine::Position;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body shared by every exchange route.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    /// Model id; must be on the configured allow-list.
    pub model: String,
    /// Board state in FEN. Passed through unvalidated.
    pub game_state: String,
    #[serde(default)]
    pub move_history: Vec<String>,
}

impl MoveRequest {
    pub fn position(&self) -> Position {
        Position::new(self.game_state.clone(), self.move_history.clone())
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "API is operational",
    })
}

async fn decide(
    state: &GatewayState,
    body: &MoveRequest,
    exchange: ExchangeKind,
) -> Result<Json<Ruling>, ApiError> {
    let orchestrator = &state.orchestrator;
    let request = orchestrator.prepare(&body.model, &body.position(), exchange, false)?;
    let ruling = orchestrator
        .decide(request, orchestrator.default_deadline())
        .await?;
    Ok(Json(ruling))
}

/// POST /get_move
pub async fn post_get_move(
    State(state): State<GatewayState>,
    Json(body): Json<MoveRequest>,
) -> Result<Json<Ruling>, ApiError> {
    decide(&state, &body, ExchangeKind::MoveExchange).await
}

/// POST /draw_response
pub async fn post_draw_response(
    State(state): State<GatewayState>,
    Json(body): Json<MoveRequest>,
) -> Result<Json<Ruling>, ApiError> {
    decide(&state, &body, ExchangeKind::DrawExchange).await
}
