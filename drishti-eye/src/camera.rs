//! Frame source abstraction
//!
//! Device negotiation lives outside this crate. The pipeline only needs to
//! know whether frames are flowing, how large they are, and to grab the
//! current one.

use bytes::Bytes;
use drishti_core::{FrameSize, Millis};

/// A captured camera frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub size: FrameSize,
    pub captured_at_ms: Millis,
    /// Mean luminance in [0, 1], when the source measures it
    pub mean_luminance: Option<f32>,
    /// Encoded or raw pixel data, opaque to the pipeline
    pub data: Bytes,
}

impl Frame {
    pub fn new(size: FrameSize, captured_at_ms: Millis) -> Self {
        Self {
            size,
            captured_at_ms,
            mean_luminance: None,
            data: Bytes::new(),
        }
    }

    pub fn with_luminance(mut self, luminance: f32) -> Self {
        self.mean_luminance = Some(luminance);
        self
    }

    pub fn with_data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    /// Unknown luminance never reports low light
    pub fn is_low_light(&self, threshold: f32) -> bool {
        self.mean_luminance
            .map(|l| l.is_finite() && l < threshold)
            .unwrap_or(false)
    }
}

/// Live frame provider polled once per tick
#[cfg_attr(test, mockall::automock)]
pub trait FrameSource: Send + Sync {
    /// True once the source is streaming frames
    fn is_ready(&self) -> bool;

    fn frame_size(&self) -> FrameSize;

    /// Current frame, or `None` if the source stalled since `is_ready`
    fn capture(&self) -> Option<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_light() {
        let frame = Frame::new(FrameSize::new(640, 480), 0).with_luminance(0.05);
        assert!(frame.is_low_light(0.15));

        let frame = Frame::new(FrameSize::new(640, 480), 0).with_luminance(0.5);
        assert!(!frame.is_low_light(0.15));
    }

    #[test]
    fn test_unknown_luminance_is_not_low_light() {
        let frame = Frame::new(FrameSize::new(640, 480), 0);
        assert!(!frame.is_low_light(0.15));

        let frame = Frame::new(FrameSize::new(640, 480), 0).with_luminance(f32::NAN);
        assert!(!frame.is_low_light(0.15));
    }
}
