// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Kibitz.
//!
//! Provides a scripted provider adapter for deterministic orchestrator and
//! gateway tests without network access.

pub mod scripted_provider;

pub use scripted_provider::{ScriptedProvider, Step};
