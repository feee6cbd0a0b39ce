//! Configuration for drishti-eye

use serde::{Deserialize, Serialize};

/// Vision stage configuration: sampling, relevance gating and tracking thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Minimum spacing between detector invocations
    pub min_inference_interval_ms: u64,
    /// Confidence floor for classes on the active environment's allowlist
    pub baseline_confidence: f32,
    /// Confidence a class off the allowlist must exceed
    pub off_context_confidence: f32,
    /// Evidence lead one context needs over the other before the mode switches
    pub mode_switch_margin: u32,
    /// Consecutive evidence-free cycles before the mode falls back to scanning (0 disables)
    pub scanning_decay_cycles: u32,
    /// Share of the previous smoothed box kept on each update
    pub smoothing_retain: f32,
    /// Per-axis centre shift, as a fraction of the frame diagonal, still judged stable
    pub stable_delta_fraction: f32,
    /// Growth of area ratio between observations that counts as approaching
    pub approach_area_delta: f32,
    /// Horizontal centre shift, as a fraction of frame width, that counts as lateral motion
    pub lateral_delta_fraction: f32,
    /// Area ratio above which an object is very close
    pub high_area_ratio: f32,
    /// Area ratio above which an object is near
    pub medium_area_ratio: f32,
    /// Unseen time after which a tracked object is evicted
    pub eviction_ms: u64,
    /// Upper bound on simultaneously tracked labels
    pub max_tracks: usize,
    /// Mean luminance below which the scene is reported as low light
    pub low_light_threshold: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            min_inference_interval_ms: 150,
            baseline_confidence: 0.6,
            off_context_confidence: 0.85,
            mode_switch_margin: 1,
            scanning_decay_cycles: 40,
            smoothing_retain: 0.7,
            // 60px at a 640x480 reference frame (diagonal 800px)
            stable_delta_fraction: 0.075,
            approach_area_delta: 0.025,
            lateral_delta_fraction: 0.04,
            high_area_ratio: 0.4,
            medium_area_ratio: 0.15,
            eviction_ms: 1200,
            max_tracks: 64,
            low_light_threshold: 0.15,
        }
    }
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_inference_interval_ms > 10_000 {
            return Err("Inference interval too large (max 10000 ms)".to_string());
        }

        for (name, value) in [
            ("baseline_confidence", self.baseline_confidence),
            ("off_context_confidence", self.off_context_confidence),
            ("smoothing_retain", self.smoothing_retain),
            ("stable_delta_fraction", self.stable_delta_fraction),
            ("approach_area_delta", self.approach_area_delta),
            ("lateral_delta_fraction", self.lateral_delta_fraction),
            ("high_area_ratio", self.high_area_ratio),
            ("medium_area_ratio", self.medium_area_ratio),
            ("low_light_threshold", self.low_light_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0", name));
            }
        }

        if self.off_context_confidence < self.baseline_confidence {
            return Err("off_context_confidence cannot be below baseline_confidence".to_string());
        }

        if self.medium_area_ratio >= self.high_area_ratio {
            return Err("medium_area_ratio must be below high_area_ratio".to_string());
        }

        if self.eviction_ms == 0 {
            return Err("Eviction window must be greater than 0".to_string());
        }

        if self.max_tracks == 0 || self.max_tracks > 1000 {
            return Err("max_tracks must be between 1 and 1000".to_string());
        }

        Ok(())
    }
}
