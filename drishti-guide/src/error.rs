//! Error types for drishti-guide

use drishti_core::Error as CoreError;
use drishti_eye::VisionError;
use drishti_spk::SpeechError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuidanceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Guidance service already running")]
    AlreadyRunning,

    #[error("Pipeline lost: the tick loop had to be aborted")]
    PipelineLost,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GuidanceError> for CoreError {
    fn from(err: GuidanceError) -> Self {
        match err {
            GuidanceError::Io(e) => CoreError::Io(e),
            GuidanceError::Config(msg) => CoreError::Configuration(msg),
            GuidanceError::Parse(e) => CoreError::Configuration(e.to_string()),
            GuidanceError::Vision(e) => e.into(),
            GuidanceError::Speech(e) => e.into(),
            other => CoreError::Pipeline(other.to_string()),
        }
    }
}
