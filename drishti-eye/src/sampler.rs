//! Frame sampler
//!
//! Called once per display refresh. Decides whether this tick runs a fresh
//! inference or reuses the previous cycle's detections.

use crate::camera::{Frame, FrameSource};
use drishti_core::{Detection, Millis};
use tracing::trace;

/// Outcome of polling the sampler for one display tick
#[derive(Debug)]
pub enum SampleDecision {
    /// Frame source is not streaming yet; retry next tick
    NotReady,
    /// Too soon since the last inference; reuse cached detections
    Reuse,
    /// Run the detector on this frame
    Infer(Frame),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub ticks: u64,
    pub inferences: u64,
    pub reuses: u64,
    pub not_ready: u64,
}

/// Throttles detector invocations relative to the display refresh rate
pub struct FrameSampler {
    min_interval_ms: Millis,
    last_inference_ms: Option<Millis>,
    cached: Vec<Detection>,
    stats: SamplerStats,
}

impl FrameSampler {
    pub fn new(min_interval_ms: Millis) -> Self {
        Self {
            min_interval_ms,
            last_inference_ms: None,
            cached: Vec::new(),
            stats: SamplerStats::default(),
        }
    }

    /// Decide what this tick does. Never blocks and never fails: a source
    /// that is not ready simply makes the tick a no-op.
    pub fn poll(&mut self, source: &dyn FrameSource, now_ms: Millis) -> SampleDecision {
        self.stats.ticks += 1;

        if !source.is_ready() {
            self.stats.not_ready += 1;
            trace!("Frame source not ready, skipping tick");
            return SampleDecision::NotReady;
        }

        if let Some(last) = self.last_inference_ms {
            if now_ms.saturating_sub(last) < self.min_interval_ms {
                self.stats.reuses += 1;
                return SampleDecision::Reuse;
            }
        }

        match source.capture() {
            Some(frame) => {
                self.last_inference_ms = Some(now_ms);
                self.stats.inferences += 1;
                SampleDecision::Infer(frame)
            }
            None => {
                self.stats.not_ready += 1;
                trace!("Frame source ready but produced no frame");
                SampleDecision::NotReady
            }
        }
    }

    /// Remember the detections of the cycle that just ran
    pub fn store(&mut self, detections: Vec<Detection>) {
        self.cached = detections;
    }

    pub fn cached(&self) -> &[Detection] {
        &self.cached
    }

    pub fn last_inference_ms(&self) -> Option<Millis> {
        self.last_inference_ms
    }

    pub fn stats(&self) -> SamplerStats {
        self.stats
    }

    /// Forget the cached cycle, e.g. after the pipeline stops
    pub fn reset(&mut self) {
        self.last_inference_ms = None;
        self.cached.clear();
    }
}
