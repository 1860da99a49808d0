// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stream orchestrator: the single entry point for running an exchange.
//!
//! One exchange is one lazy pipeline. The adapter's progress stream is pulled
//! only when the caller pulls, the whole exchange (open call included) is
//! bounded by the caller's deadline, and the first failure ends it. Dropping
//! the returned stream drops the adapter stream and its connection.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use kibitz_config::KibitzConfig;
use kibitz_core::classify::classify;
use kibitz_core::estimate::estimate;
use kibitz_core::{
    CanonicalEvent, ExchangeKind, KibitzError, Outcome, Progress, ProgressStream,
    ProviderAdapter, ProviderFamily, ProviderRequest, Ruling,
};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::prompt::Position;
use crate::registry::ProviderRegistry;

/// Canonical events of one exchange, ending in `Done` or `Error`.
pub type EventStream = Pin<Box<dyn Stream<Item = CanonicalEvent> + Send>>;

/// Finalizes a finished exchange into its ruling.
pub fn rule(exchange: ExchangeKind, outcome: &Outcome) -> Ruling {
    Ruling {
        verdict: classify(exchange, &outcome.response),
        reasoning_cost: estimate(outcome.reported_reasoning, &outcome.thinking),
    }
}

/// Entry point for move and draw exchanges.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    deadline: Duration,
}

impl Orchestrator {
    /// Create an orchestrator whose exchanges default to `deadline`.
    pub fn new(registry: ProviderRegistry, deadline: Duration) -> Self {
        Self {
            registry: Arc::new(registry),
            deadline,
        }
    }

    /// Build the registry and default deadline from configuration.
    pub fn from_config(config: &KibitzConfig) -> Result<Self, KibitzError> {
        let registry = ProviderRegistry::from_config(config)?;
        Ok(Self::new(
            registry,
            Duration::from_secs(config.engine.deadline_secs),
        ))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Deadline for an exchange starting now.
    pub fn default_deadline(&self) -> Instant {
        Instant::now() + self.deadline
    }

    /// Resolves `model` and renders the prompt into a request.
    pub fn prepare(
        &self,
        model: &str,
        position: &Position,
        exchange: ExchangeKind,
        stream: bool,
    ) -> Result<ProviderRequest, KibitzError> {
        let family = self.registry.family_for(model)?;
        Ok(ProviderRequest {
            family,
            model: model.to_string(),
            prompt: position.render_prompt(exchange),
            exchange,
            stream,
        })
    }

    /// Runs `request` as a stream of canonical events.
    ///
    /// On success the translator's events are followed by exactly one
    /// `Result` and then `Done`. Any failure yields one `Error` instead and
    /// nothing follows it.
    pub fn stream(&self, request: ProviderRequest, deadline: Instant) -> EventStream {
        let exchange = request.exchange;
        let progress: ProgressStream = match self.registry.adapter(request.family) {
            Ok(adapter) => run(adapter, request, deadline),
            Err(e) => Box::pin(stream::once(async move { Err(e) })),
        };

        Box::pin(progress.flat_map(move |item| {
            let events = match item {
                Ok(Progress::Event(event)) => vec![event],
                Ok(Progress::Finished(outcome)) => {
                    let ruling = rule(exchange, &outcome);
                    debug!(cost = ruling.reasoning_cost, "exchange finished");
                    vec![CanonicalEvent::Result { ruling }, CanonicalEvent::Done]
                }
                Err(e) => vec![CanonicalEvent::Error {
                    message: e.to_string(),
                }],
            };
            stream::iter(events)
        }))
    }

    /// Runs `request` to completion and returns its ruling.
    ///
    /// Asks the adapter for unary delivery; canonical events are discarded.
    pub async fn decide(
        &self,
        mut request: ProviderRequest,
        deadline: Instant,
    ) -> Result<Ruling, KibitzError> {
        request.stream = false;
        let exchange = request.exchange;
        let adapter = self.registry.adapter(request.family)?;
        let mut progress = run(adapter, request, deadline);

        while let Some(item) = progress.next().await {
            if let Progress::Finished(outcome) = item? {
                let ruling = rule(exchange, &outcome);
                debug!(cost = ruling.reasoning_cost, "exchange decided");
                return Ok(ruling);
            }
        }
        Err(KibitzError::Internal(
            "exchange ended without a result".to_string(),
        ))
    }
}

enum Stage {
    Pending(Arc<dyn ProviderAdapter>, ProviderRequest),
    Open(ProgressStream),
    Closed,
}

struct Run {
    stage: Stage,
    family: ProviderFamily,
    /// Adapter declared its usage figures reasoning-only.
    trust_usage: bool,
    deadline: Instant,
    budget: Duration,
}

impl Run {
    fn fail(mut self, err: KibitzError) -> Option<(Result<Progress, KibitzError>, Self)> {
        self.stage = Stage::Closed;
        Some((Err(err), self))
    }

    fn timed_out(&self) -> KibitzError {
        warn!(budget = ?self.budget, "exchange deadline expired");
        KibitzError::Timeout {
            family: self.family,
            duration: self.budget,
        }
    }
}

/// Opens the adapter lazily and pulls its progress under `deadline`.
///
/// The stream ends after the first error or after `Finished`.
fn run(
    adapter: Arc<dyn ProviderAdapter>,
    mut request: ProviderRequest,
    deadline: Instant,
) -> ProgressStream {
    let capabilities = adapter.capabilities();
    request.stream &= capabilities.streaming;
    let state = Run {
        trust_usage: capabilities.usage_reporting,
        family: request.family,
        stage: Stage::Pending(adapter, request),
        deadline,
        budget: deadline.saturating_duration_since(Instant::now()),
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            match std::mem::replace(&mut state.stage, Stage::Closed) {
                Stage::Pending(adapter, request) => {
                    debug!(
                        provider = adapter.name(),
                        model = %request.model,
                        stream = request.stream,
                        "opening exchange"
                    );
                    match timeout_at(state.deadline, adapter.open(&request)).await {
                        Ok(Ok(progress)) => state.stage = Stage::Open(progress),
                        Ok(Err(e)) => {
                            warn!(error = %e, "exchange failed to open");
                            return state.fail(e);
                        }
                        Err(_) => {
                            let err = state.timed_out();
                            return state.fail(err);
                        }
                    }
                }
                Stage::Open(mut progress) => {
                    return match timeout_at(state.deadline, progress.next()).await {
                        Ok(Some(Ok(Progress::Event(event)))) => {
                            state.stage = Stage::Open(progress);
                            Some((Ok(Progress::Event(event)), state))
                        }
                        // Stage stays closed; the adapter stream is dropped here.
                        Ok(Some(Ok(Progress::Finished(mut outcome)))) => {
                            if !state.trust_usage
                                && outcome.reported_reasoning.take().is_some()
                            {
                                debug!("ignoring usage from adapter without usage reporting");
                            }
                            Some((Ok(Progress::Finished(outcome)), state))
                        }
                        Ok(Some(Err(e))) => {
                            warn!(error = %e, "exchange failed");
                            state.fail(e)
                        }
                        Ok(None) => {
                            let err = KibitzError::upstream(
                                state.family,
                                "stream ended without a terminal signal",
                            );
                            state.fail(err)
                        }
                        Err(_) => {
                            let err = state.timed_out();
                            state.fail(err)
                        }
                    };
                }
                Stage::Closed => return None,
            }
        }
    }))
}
