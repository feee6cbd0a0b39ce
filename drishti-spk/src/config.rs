//! Configuration for narration

use drishti_core::Language;
use serde::{Deserialize, Serialize};

/// Narration channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Maximum entries waiting behind the utterance in flight
    pub max_pending: usize,

    /// Spoken instead of text whose language has no installed voice
    pub fallback_phrase: String,

    /// Language the fallback phrase is written in; must always have a voice
    pub fallback_language: Language,

    /// Speech rate (words per minute, 80-500, default 135)
    pub rate: u32,

    /// Volume (0.0-1.0, default 0.8)
    pub volume: f32,

    /// Pitch adjustment (-1.0 to 1.0, default 0.0)
    pub pitch: f32,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            max_pending: 2,
            fallback_phrase: "Voice for the selected language is missing. Please install it in the system speech settings."
                .to_string(),
            fallback_language: Language::English,
            rate: 135,
            volume: 0.8,
            pitch: 0.0,
        }
    }
}

impl NarrationConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pending == 0 {
            return Err("max_pending must be greater than 0".to_string());
        }

        if self.max_pending > 16 {
            return Err("max_pending too large (max 16)".to_string());
        }

        if self.fallback_phrase.trim().is_empty() {
            return Err("Fallback phrase cannot be empty".to_string());
        }

        if self.fallback_phrase.chars().any(|c| c == '\0') {
            return Err("Fallback phrase contains null bytes".to_string());
        }

        if !(80..=500).contains(&self.rate) {
            return Err("Speech rate must be between 80 and 500 WPM".to_string());
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err("Volume must be between 0.0 and 1.0".to_string());
        }

        if !(-1.0..=1.0).contains(&self.pitch) {
            return Err("Pitch must be between -1.0 and 1.0".to_string());
        }

        Ok(())
    }
}
