//! Per-cycle context handed to every stage

use drishti_core::{FrameSize, Language, Millis};

/// Immutable snapshot of the settings a cycle runs under. Language and mute
/// are read once per cycle so a change never lands halfway through one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleContext {
    pub now_ms: Millis,
    pub language: Language,
    pub muted: bool,
    pub frame: FrameSize,
}

impl CycleContext {
    pub fn new(now_ms: Millis, language: Language, frame: FrameSize) -> Self {
        Self {
            now_ms,
            language,
            muted: false,
            frame,
        }
    }

    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }
}

/// User-facing settings that may change between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NarrationSettings {
    pub language: Language,
    pub muted: bool,
}

impl NarrationSettings {
    pub fn context(&self, now_ms: Millis, frame: FrameSize) -> CycleContext {
        CycleContext::new(now_ms, self.language, frame).muted(self.muted)
    }
}
