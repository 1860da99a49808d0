// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drives a provider translator over its raw event sequence.
//!
//! [`drive`] pulls one raw event at a time, hands it to the [`Translator`],
//! and forwards the resulting canonical events before pulling the next one.
//! The stream ends with exactly one [`Progress::Finished`] on success, or
//! with a single error item.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};

use crate::error::KibitzError;
use crate::transcript::{Outcome, Transcript};
use crate::types::CanonicalEvent;

/// Lazy, single-pass sequence of raw provider events.
pub type RawStream<R> = Pin<Box<dyn Stream<Item = Result<R, KibitzError>> + Send>>;

/// Canonical progress of one exchange, as produced by [`drive`].
pub type ProgressStream = Pin<Box<dyn Stream<Item = Result<Progress, KibitzError>> + Send>>;

/// One item of translated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A canonical event to forward to the caller.
    Event(CanonicalEvent),
    /// The terminal signal was seen; the accumulated state is ready to finalize.
    Finished(Outcome),
}

/// Whether a raw event was the provider's terminal signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished,
}

/// Per-provider state machine mapping raw events onto the canonical taxonomy.
pub trait Translator: Send + 'static {
    /// The provider's raw event shape.
    type Raw: Send + 'static;

    /// Called once before the first raw event is pulled. Protocols that
    /// always open with a reasoning phase emit `ThinkingStart` here.
    fn opening(&mut self, _out: &mut Vec<CanonicalEvent>) {}

    /// Translates one raw event, pushing any canonical events onto `out`.
    fn translate(
        &mut self,
        raw: Self::Raw,
        out: &mut Vec<CanonicalEvent>,
    ) -> Result<Flow, KibitzError>;

    /// The transcript this translator feeds.
    fn transcript_mut(&mut self) -> &mut Transcript;

    /// Produces the finished outcome after the terminal signal.
    fn conclude(&mut self) -> Outcome {
        self.transcript_mut().take_outcome()
    }
}

/// Wraps a single raw event as a one-shot raw stream.
///
/// Non-streaming exchanges use this so they share the streaming pipeline.
pub fn once<R: Send + 'static>(raw: R) -> RawStream<R> {
    Box::pin(stream::iter([Ok(raw)]))
}

enum Stage {
    Opening,
    Streaming,
    Concluding,
    Done,
}

struct DriveState<T: Translator> {
    raw: RawStream<T::Raw>,
    translator: T,
    pending: VecDeque<CanonicalEvent>,
    stage: Stage,
}

impl<T: Translator> DriveState<T> {
    /// Closes open phases and releases the raw stream (and its connection).
    fn close(&mut self) {
        let mut out = Vec::new();
        self.translator.transcript_mut().finish(&mut out);
        self.pending.extend(out);
        self.raw = Box::pin(stream::empty());
        self.stage = Stage::Concluding;
    }
}

/// Runs `translator` over `raw`, yielding canonical progress in order.
///
/// The end of the raw stream counts as a terminal signal. A raw or
/// translation error is yielded once and ends the stream.
pub fn drive<T: Translator>(raw: RawStream<T::Raw>, translator: T) -> ProgressStream {
    let state = DriveState {
        raw,
        translator,
        pending: VecDeque::new(),
        stage: Stage::Opening,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((Ok(Progress::Event(event)), state));
            }

            match state.stage {
                Stage::Opening => {
                    let mut out = Vec::new();
                    state.translator.opening(&mut out);
                    state.pending.extend(out);
                    state.stage = Stage::Streaming;
                }
                Stage::Streaming => match state.raw.next().await {
                    Some(Ok(raw)) => {
                        let mut out = Vec::new();
                        match state.translator.translate(raw, &mut out) {
                            Ok(flow) => {
                                state.pending.extend(out);
                                if flow == Flow::Finished {
                                    state.close();
                                }
                            }
                            Err(e) => {
                                state.stage = Stage::Done;
                                return Some((Err(e), state));
                            }
                        }
                    }
                    Some(Err(e)) => {
                        state.stage = Stage::Done;
                        return Some((Err(e), state));
                    }
                    None => state.close(),
                },
                Stage::Concluding => {
                    state.stage = Stage::Done;
                    let outcome = state.translator.conclude();
                    return Some((Ok(Progress::Finished(outcome)), state));
                }
                Stage::Done => return None,
            }
        }
    }))
}
