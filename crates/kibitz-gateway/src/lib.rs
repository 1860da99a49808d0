// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Kibitz.
//!
//! Exposes the orchestrator over four routes: `/health`, `/get_move`,
//! `/get_move_stream` (Server-Sent Events) and `/draw_response`.

pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use error::ApiError;
pub use server::{GatewayState, ServerConfig, build_router, start_server};
