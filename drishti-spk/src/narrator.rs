//! Single-flight narration channel
//!
//! Drives a `NarrationQueue` against a `NarrationEngine`. Each utterance runs
//! as its own tokio task; preemption aborts that task, which drops the
//! engine future and stops playback.

use crate::config::NarrationConfig;
use crate::engines::NarrationEngine;
use crate::error::SpeechError;
use crate::queue::{NarrationQueue, QueueDecision, QueueEntry, Utterance, UtteranceOutcome};
use drishti_core::{Language, Priority};
use parking_lot::{Mutex, RwLock};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Result of handing an entry to the narrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Started,
    /// Interrupted the utterance in flight and cleared the backlog
    Preempted,
    Queued(usize),
    Deduplicated,
    Shed,
    /// Narrator is shut down
    Rejected,
}

struct State {
    queue: NarrationQueue,
    in_flight: Option<JoinHandle<()>>,
    /// Completions whose callback has not returned yet
    settling: usize,
}

struct Inner {
    engine: Arc<dyn NarrationEngine>,
    config: NarrationConfig,
    state: Mutex<State>,
    is_running: RwLock<bool>,
    idle: Notify,
}

/// Cloneable handle to the narration channel
#[derive(Clone)]
pub struct Narrator {
    inner: Arc<Inner>,
}

impl Narrator {
    pub fn new(engine: Arc<dyn NarrationEngine>, config: NarrationConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        if !engine.has_voice(config.fallback_language) {
            warn!(
                "Engine {} has no voice for fallback language {}",
                engine.name(),
                config.fallback_language
            );
        }

        info!("Narrator ready on engine {}", engine.name());
        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    queue: NarrationQueue::new(config.max_pending),
                    in_flight: None,
                    settling: 0,
                }),
                engine,
                config,
                is_running: RwLock::new(true),
                idle: Notify::new(),
            }),
        })
    }

    /// Convenience wrapper around `submit` for entries without a callback
    pub fn say(&self, text: impl Into<String>, language: Language, priority: Priority) -> Submission {
        self.submit(QueueEntry::new(text, language, priority))
    }

    /// Hand an entry to the channel. Never blocks; must be called from
    /// within a tokio runtime.
    pub fn submit(&self, entry: QueueEntry) -> Submission {
        if !*self.inner.is_running.read() {
            debug!("Narrator stopped, rejecting \"{}\"", entry.text);
            Self::complete(entry, UtteranceOutcome::Dropped);
            return Submission::Rejected;
        }

        let mut cancelled = None;
        let mut dropped = Vec::new();

        let submission = {
            let mut state = self.inner.state.lock();
            match state.queue.submit(entry) {
                QueueDecision::Start(utterance) => {
                    self.spawn(&mut state, utterance);
                    Submission::Started
                }
                QueueDecision::Preempt {
                    start,
                    interrupted,
                    discarded,
                } => {
                    if let Some(handle) = state.in_flight.take() {
                        handle.abort();
                    }
                    self.inner.engine.cancel();
                    info!(
                        "Preempting \"{}\" ({} pending discarded) for \"{}\"",
                        interrupted.text,
                        discarded.len(),
                        start.text
                    );
                    self.spawn(&mut state, start);
                    cancelled = Some(interrupted);
                    dropped = discarded;
                    Submission::Preempted
                }
                QueueDecision::Queued(position) => Submission::Queued(position),
                QueueDecision::Duplicate(entry) => {
                    debug!("Dropping duplicate \"{}\"", entry.text);
                    dropped.push(entry);
                    Submission::Deduplicated
                }
                QueueDecision::Shed(entry) => {
                    debug!("Backlog full, shedding \"{}\"", entry.text);
                    dropped.push(entry);
                    Submission::Shed
                }
            }
        };

        if let Some(entry) = cancelled {
            Self::complete(entry, UtteranceOutcome::Cancelled);
        }
        for entry in dropped {
            Self::complete(entry, UtteranceOutcome::Dropped);
        }

        submission
    }

    fn spawn(&self, state: &mut State, utterance: Utterance) {
        let narrator = self.clone();
        state.in_flight = Some(tokio::spawn(async move {
            let outcome = narrator.perform(&utterance).await;
            narrator.on_finished(utterance.generation, outcome);
        }));
    }

    async fn perform(&self, utterance: &Utterance) -> UtteranceOutcome {
        let engine = &self.inner.engine;

        if !engine.has_voice(utterance.language) {
            warn!("No voice for {}, speaking fallback notice", utterance.language);
            return self.speak_fallback().await;
        }

        debug!("Speaking \"{}\" ({})", utterance.text, utterance.language);
        match engine.speak(&utterance.text, utterance.language).await {
            Ok(()) => UtteranceOutcome::Spoken,
            Err(SpeechError::VoiceUnavailable(reason)) => {
                warn!("Voice unavailable ({}), speaking fallback notice", reason);
                self.speak_fallback().await
            }
            Err(e) => {
                error!("Narration failed for \"{}\": {}", utterance.text, e);
                UtteranceOutcome::Failed
            }
        }
    }

    async fn speak_fallback(&self) -> UtteranceOutcome {
        let config = &self.inner.config;
        match self
            .inner
            .engine
            .speak(&config.fallback_phrase, config.fallback_language)
            .await
        {
            Ok(()) => UtteranceOutcome::Substituted,
            Err(e) => {
                error!("Fallback notice failed: {}", e);
                UtteranceOutcome::Failed
            }
        }
    }

    fn on_finished(&self, generation: u64, outcome: UtteranceOutcome) {
        let (done, next) = {
            let mut state = self.inner.state.lock();
            match state.queue.finish(generation) {
                Some(finished) => {
                    state.in_flight = None;
                    state.settling += 1;
                    finished
                }
                None => {
                    debug!("Ignoring completion of replaced utterance {}", generation);
                    return;
                }
            }
        };

        Self::complete(done, outcome);

        let mut state = self.inner.state.lock();
        state.settling -= 1;
        if let Some(next) = next {
            // A preemption or shutdown may have replaced it while the callback ran
            if state.queue.current_generation() == Some(next.generation) {
                self.spawn(&mut state, next);
            }
        }
        Self::notify_if_idle(&self.inner, &state);
    }

    /// Run the entry's callback. A panicking callback is logged and must not
    /// leave the channel half-released.
    fn complete(entry: QueueEntry, outcome: UtteranceOutcome) {
        let text = entry.text.clone();
        if panic::catch_unwind(AssertUnwindSafe(move || entry.complete(outcome))).is_err() {
            error!("Completion callback for \"{}\" panicked", text);
        }
    }

    fn notify_if_idle(inner: &Inner, state: &State) {
        if !state.queue.is_speaking() && state.settling == 0 {
            inner.idle.notify_waiters();
        }
    }

    /// Cancel the utterance in flight, drop the backlog and refuse new entries
    pub fn shutdown(&self) {
        {
            let mut is_running = self.inner.is_running.write();
            if !*is_running {
                return;
            }
            *is_running = false;
        }

        let (interrupted, pending) = {
            let mut state = self.inner.state.lock();
            if let Some(handle) = state.in_flight.take() {
                handle.abort();
            }
            state.queue.clear()
        };
        self.inner.engine.cancel();

        if let Some(entry) = interrupted {
            Self::complete(entry, UtteranceOutcome::Cancelled);
        }
        for entry in pending {
            Self::complete(entry, UtteranceOutcome::Dropped);
        }

        let state = self.inner.state.lock();
        Self::notify_if_idle(&self.inner, &state);
        info!("Narrator stopped");
    }

    /// Accept entries again after `shutdown`
    pub fn resume(&self) {
        let mut is_running = self.inner.is_running.write();
        if !*is_running {
            *is_running = true;
            info!("Narrator resumed");
        }
    }

    /// Resolve once nothing is speaking and every finished entry's callback
    /// has returned
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    pub fn is_idle(&self) -> bool {
        let state = self.inner.state.lock();
        !state.queue.is_speaking() && state.settling == 0
    }

    pub fn is_running(&self) -> bool {
        *self.inner.is_running.read()
    }

    pub fn is_speaking(&self) -> bool {
        self.inner.state.lock().queue.is_speaking()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().queue.pending_len()
    }

    pub fn current_text(&self) -> Option<String> {
        self.inner.state.lock().queue.current_text().map(str::to_string)
    }

    pub fn engine_name(&self) -> &str {
        self.inner.engine.name()
    }
}
