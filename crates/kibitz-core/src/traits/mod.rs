// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Adapters use `#[async_trait]` so they can be held as `Arc<dyn ProviderAdapter>`.

pub mod provider;

pub use provider::ProviderAdapter;
