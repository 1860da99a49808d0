// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted provider adapter for deterministic testing.
//!
//! `ScriptedProvider` replays a fixed list of raw steps through the real
//! [`Transcript`] machinery, so orchestrator tests observe exactly the event
//! sequences a network adapter would produce.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use kibitz_core::{
    CanonicalEvent, Capabilities, Flow, KibitzError, ProgressStream, ProviderAdapter,
    ProviderFamily, ProviderRequest, RawStream, Transcript, Translator, drive,
};

/// One raw step of a scripted exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Reasoning text.
    Reason(String),
    /// Answer text.
    Answer(String),
    /// Reasoning-only usage figure.
    Usage(i64),
    /// Explicit terminal signal. Steps after it are never pulled.
    Stop,
    /// Upstream failure with the given message.
    Fail(String),
    /// Never yields again.
    Stall,
}

impl Step {
    pub fn reason(text: &str) -> Self {
        Self::Reason(text.to_string())
    }

    pub fn answer(text: &str) -> Self {
        Self::Answer(text.to_string())
    }

    pub fn fail(message: &str) -> Self {
        Self::Fail(message.to_string())
    }
}

struct ScriptedTranslator {
    transcript: Transcript,
    family: ProviderFamily,
    eager: bool,
}

impl Translator for ScriptedTranslator {
    type Raw = Step;

    fn opening(&mut self, out: &mut Vec<CanonicalEvent>) {
        if self.eager {
            self.transcript.begin_thinking(out);
        }
    }

    fn translate(
        &mut self,
        raw: Step,
        out: &mut Vec<CanonicalEvent>,
    ) -> Result<Flow, KibitzError> {
        match raw {
            Step::Reason(text) => self.transcript.thinking(&text, out),
            Step::Answer(text) => self.transcript.response(&text, out),
            Step::Usage(n) => self.transcript.report_reasoning(Some(n)),
            Step::Stop => return Ok(Flow::Finished),
            Step::Fail(message) => return Err(KibitzError::upstream(self.family, message)),
            // Filtered out before translation.
            Step::Stall => {}
        }
        Ok(Flow::Continue)
    }

    fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }
}

/// Held by an open raw stream; released when the stream is dropped.
struct Connection(Arc<AtomicUsize>);

impl Connection {
    fn open(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(live))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A provider adapter that replays a fixed script on every open.
pub struct ScriptedProvider {
    family: ProviderFamily,
    script: Vec<Step>,
    eager: bool,
    streaming: bool,
    usage_reporting: bool,
    credential: bool,
    open_delay: Option<Duration>,
    opens: AtomicUsize,
    live: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl ScriptedProvider {
    /// Create a scripted provider for `family`.
    pub fn new(family: ProviderFamily, script: Vec<Step>) -> Self {
        Self {
            family,
            script,
            eager: false,
            streaming: true,
            usage_reporting: true,
            credential: true,
            open_delay: None,
            opens: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Emit `ThinkingStart` as soon as the exchange opens.
    pub fn eager_reasoning(mut self) -> Self {
        self.eager = true;
        self
    }

    /// Advertise no native streaming support.
    pub fn without_streaming(mut self) -> Self {
        self.streaming = false;
        self
    }

    /// Advertise usage figures that mix reasoning and answer tokens.
    pub fn without_usage_reporting(mut self) -> Self {
        self.usage_reporting = false;
        self
    }

    /// Fail every open with a configuration error, as if no key were set.
    pub fn without_credential(mut self) -> Self {
        self.credential = false;
        self
    }

    /// Delay every open by `delay` before the script starts.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// Number of exchanges opened so far, including failed ones.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Raw streams opened and not yet dropped, i.e. connections still held.
    pub fn live_connections(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    fn raw_stream(&self) -> RawStream<Step> {
        let mut steps = Vec::new();
        let mut stalls = false;
        for step in &self.script {
            if *step == Step::Stall {
                stalls = true;
                break;
            }
            steps.push(Ok(step.clone()));
        }

        let connection = Connection::open(&self.live);
        let replay = stream::iter(steps);
        let raw: RawStream<Step> = if stalls {
            Box::pin(replay.chain(stream::pending()))
        } else {
            Box::pin(replay)
        };
        Box::pin(raw.map(move |step| {
            let _held = &connection;
            step
        }))
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn family(&self) -> ProviderFamily {
        self.family
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            streaming: self.streaming,
            usage_reporting: self.usage_reporting,
        }
    }

    async fn open(&self, request: &ProviderRequest) -> Result<ProgressStream, KibitzError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        if !self.credential {
            return Err(KibitzError::Config(format!(
                "{} API key not configured",
                self.family.api_name()
            )));
        }
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }

        let translator = ScriptedTranslator {
            transcript: Transcript::new(),
            family: self.family,
            eager: self.eager,
        };
        Ok(drive(self.raw_stream(), translator))
    }
}
