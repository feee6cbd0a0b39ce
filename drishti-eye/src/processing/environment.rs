//! Indoor / outdoor context classification
//!
//! The mode is inferred from which hand-curated class sets dominate a cycle
//! and gates how much confidence an out-of-context class needs before the
//! tracker ingests it.

use crate::config::VisionConfig;
use drishti_core::{Detection, EnvironmentMode};
use tracing::{debug, info};

/// Classes that only make sense inside buildings
pub const INDOOR_CLASSES: &[&str] = &[
    "chair",
    "couch",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "potted plant",
    "cup",
    "bottle",
    "wine glass",
    "bowl",
    "teddy bear",
];

/// Classes that only make sense outside. Disjoint from `INDOOR_CLASSES`.
pub const OUTDOOR_CLASSES: &[&str] = &[
    "car",
    "bus",
    "truck",
    "motorcycle",
    "bicycle",
    "train",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "boat",
    "airplane",
    "horse",
    "cow",
    "sheep",
];

/// Classes plausible in either context; on every allowlist
pub const NEUTRAL_CLASSES: &[&str] = &[
    "person",
    "dog",
    "cat",
    "bird",
    "backpack",
    "umbrella",
    "handbag",
    "suitcase",
    "cell phone",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Indoor,
    Outdoor,
    Neutral,
    Unknown,
}

fn context_of(label: &str) -> Context {
    let label = label.trim();
    if INDOOR_CLASSES.iter().any(|c| c.eq_ignore_ascii_case(label)) {
        Context::Indoor
    } else if OUTDOOR_CLASSES.iter().any(|c| c.eq_ignore_ascii_case(label)) {
        Context::Outdoor
    } else if NEUTRAL_CLASSES.iter().any(|c| c.eq_ignore_ascii_case(label)) {
        Context::Neutral
    } else {
        Context::Unknown
    }
}

/// Evidence tallied over a single cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evidence {
    pub indoor: u32,
    pub outdoor: u32,
}

/// Maintains the process-wide environment mode
pub struct EnvironmentClassifier {
    mode: EnvironmentMode,
    margin: u32,
    decay_cycles: u32,
    quiet_cycles: u32,
    baseline_confidence: f32,
    off_context_confidence: f32,
}

impl EnvironmentClassifier {
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            mode: EnvironmentMode::Scanning,
            margin: config.mode_switch_margin,
            decay_cycles: config.scanning_decay_cycles,
            quiet_cycles: 0,
            baseline_confidence: config.baseline_confidence,
            off_context_confidence: config.off_context_confidence,
        }
    }

    pub fn mode(&self) -> EnvironmentMode {
        self.mode
    }

    /// Tally one cycle of detections and update the mode.
    ///
    /// A context wins only when its evidence leads by more than the margin;
    /// anything closer leaves the mode where it was.
    pub fn observe(&mut self, detections: &[Detection]) -> EnvironmentMode {
        let mut evidence = Evidence::default();
        for det in detections {
            match context_of(&det.label) {
                Context::Indoor => evidence.indoor += 1,
                Context::Outdoor => evidence.outdoor += 1,
                Context::Neutral | Context::Unknown => {}
            }
        }

        let previous = self.mode;
        if evidence.indoor > evidence.outdoor + self.margin {
            self.mode = EnvironmentMode::Indoor;
        } else if evidence.outdoor > evidence.indoor + self.margin {
            self.mode = EnvironmentMode::Outdoor;
        }

        if evidence == Evidence::default() {
            self.quiet_cycles = self.quiet_cycles.saturating_add(1);
            if self.decay_cycles > 0 && self.quiet_cycles >= self.decay_cycles {
                self.mode = EnvironmentMode::Scanning;
            }
        } else {
            self.quiet_cycles = 0;
        }

        if self.mode != previous {
            info!("Environment mode changed: {} -> {}", previous, self.mode);
        } else {
            debug!(
                "Environment evidence indoor={} outdoor={}, mode stays {}",
                evidence.indoor, evidence.outdoor, self.mode
            );
        }
        self.mode
    }

    /// Whether a class is expected in the current mode
    pub fn is_on_allowlist(&self, label: &str) -> bool {
        match (self.mode, context_of(label)) {
            (EnvironmentMode::Scanning, _) => true,
            (_, Context::Neutral) => true,
            (EnvironmentMode::Indoor, Context::Indoor) => true,
            (EnvironmentMode::Outdoor, Context::Outdoor) => true,
            _ => false,
        }
    }

    /// Relevance gate used before tracker ingestion
    pub fn is_relevant(&self, detection: &Detection) -> bool {
        if !detection.score.is_finite() {
            return false;
        }
        if self.is_on_allowlist(&detection.label) {
            detection.score >= self.baseline_confidence
        } else {
            detection.score > self.off_context_confidence
        }
    }
}
