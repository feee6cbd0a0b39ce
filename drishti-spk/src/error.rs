//! Error types for drishti-spk

use drishti_core::Error as CoreError;
use thiserror::Error;

/// Narration errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Voice unavailable: {0}")]
    VoiceUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<SpeechError> for CoreError {
    fn from(err: SpeechError) -> Self {
        CoreError::Speech(err.to_string())
    }
}
