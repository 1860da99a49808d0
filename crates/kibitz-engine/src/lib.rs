// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kibitz engine: provider registry, prompt templates and the stream
//! orchestrator that turns a provider exchange into canonical events and a
//! final ruling.

pub mod orchestrator;
pub mod prompt;
pub mod registry;

pub use orchestrator::{EventStream, Orchestrator, rule};
pub use prompt::Position;
pub use registry::ProviderRegistry;
