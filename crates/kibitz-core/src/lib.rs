// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Kibitz.
//!
//! This crate provides the canonical event model, the error type, the
//! shared translator machinery and the provider adapter trait. Every
//! provider crate builds on what is defined here.

pub mod classify;
pub mod credentials;
pub mod error;
pub mod estimate;
pub mod traits;
pub mod transcript;
pub mod translate;
pub mod types;
pub mod wire;

// Re-export key items at crate root for ergonomic imports.
pub use error::KibitzError;
pub use traits::ProviderAdapter;
pub use transcript::{Outcome, Phase, Transcript};
pub use translate::{Flow, Progress, ProgressStream, RawStream, Translator, drive};
pub use types::{
    CanonicalEvent, Capabilities, Decision, DrawDecision, ExchangeKind, ProviderFamily,
    ProviderRequest, Ruling, Verdict,
};
