//! Configuration for the guidance pipeline

use crate::error::GuidanceError;
use drishti_core::Language;
use drishti_eye::processing::tracker::MAX_STABILITY;
use drishti_eye::VisionConfig;
use drishti_spk::NarrationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Announcement policy timing and confidence tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum spacing between repeats for a very close object
    pub debounce_high_ms: u64,
    /// Minimum spacing between repeats for anything else
    pub debounce_normal_ms: u64,
    /// Minimum spacing between collision warnings for one object
    pub collision_cooldown_ms: u64,
    /// Stability an object needs before it is narrated
    pub confirm_stability: u8,
    /// Confidence at which an object is named
    pub clear_confidence: f32,
    /// Confidence at which an unnamed obstacle is reported
    pub probable_confidence: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            debounce_high_ms: 2500,
            debounce_normal_ms: 4500,
            collision_cooldown_ms: 1200,
            confirm_stability: 2,
            clear_confidence: 0.7,
            probable_confidence: 0.5,
        }
    }
}

impl PolicyConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.debounce_high_ms > self.debounce_normal_ms {
            return Err("debounce_high_ms must not exceed debounce_normal_ms".to_string());
        }

        if self.confirm_stability == 0 || self.confirm_stability > MAX_STABILITY {
            return Err(format!("confirm_stability must be between 1 and {}", MAX_STABILITY));
        }

        for (name, value) in [
            ("clear_confidence", self.clear_confidence),
            ("probable_confidence", self.probable_confidence),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0", name));
            }
        }

        if self.probable_confidence > self.clear_confidence {
            return Err("probable_confidence must not exceed clear_confidence".to_string());
        }

        Ok(())
    }
}

/// Complete pipeline configuration, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Display refresh rate driving the tick loop
    pub refresh_hz: u32,
    /// Narration language at startup
    pub language: Language,
    /// Speak the welcome notice when the service starts
    pub announce_welcome: bool,
    pub vision: VisionConfig,
    pub policy: PolicyConfig,
    pub narration: NarrationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            refresh_hz: 30,
            language: Language::English,
            announce_welcome: true,
            vision: VisionConfig::default(),
            policy: PolicyConfig::default(),
            narration: NarrationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_hz == 0 || self.refresh_hz > 240 {
            return Err("refresh_hz must be between 1 and 240".to_string());
        }

        self.vision.validate().map_err(|e| format!("vision: {}", e))?;
        self.policy.validate().map_err(|e| format!("policy: {}", e))?;
        self.narration.validate().map_err(|e| format!("narration: {}", e))?;
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, GuidanceError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate().map_err(GuidanceError::Config)?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuidanceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Tick period derived from the refresh rate
    pub fn tick_interval_ms(&self) -> u64 {
        (1000 / self.refresh_hz.max(1) as u64).max(1)
    }
}
