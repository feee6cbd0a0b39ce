//! Narration engine implementations

pub mod custom;
pub mod espeak;

use crate::error::SpeechError;
use async_trait::async_trait;
use drishti_core::Language;

/// External speech output. Voice selection and synthesis are the engine's
/// business; the narrator only supplies text and language.
#[async_trait]
pub trait NarrationEngine: Send + Sync {
    /// Speak `text`, resolving once playback has finished.
    ///
    /// The narrator cancels an utterance by dropping this future, so
    /// implementations must stop playback when dropped.
    async fn speak(&self, text: &str, language: Language) -> Result<(), SpeechError>;

    /// Whether a voice for `language` is installed
    fn has_voice(&self, language: Language) -> bool;

    /// Stop any playback running outside the `speak` future
    fn cancel(&self) {}

    /// Get engine name
    fn name(&self) -> &str;
}
