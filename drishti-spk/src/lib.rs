//! drishti-spk: Narration output for the guidance pipeline
//!
//! Provides a single audio channel with:
//! - Priority preemption for danger warnings
//! - A small deduplicated backlog that sheds under load
//! - Fallback notice when a language has no installed voice
//! - Pluggable engines (espeak-ng or closure-backed)

pub mod config;
pub mod engines;
pub mod error;
pub mod narrator;
pub mod queue;

pub use config::NarrationConfig;
pub use engines::custom::{CustomNarrationEngine, SpeakFuture};
pub use engines::espeak::EspeakEngine;
pub use engines::NarrationEngine;
pub use error::SpeechError;
pub use narrator::{Narrator, Submission};
pub use queue::{CompletionCallback, NarrationQueue, QueueDecision, QueueEntry, Utterance, UtteranceOutcome};
