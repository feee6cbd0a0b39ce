//! Object detection pipeline

use crate::camera::Frame;
use crate::error::VisionError;
use async_trait::async_trait;
use drishti_core::Detection;
use std::sync::Arc;
use tracing::{debug, warn};

/// External object detector. The model itself is opaque to the pipeline.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, VisionError>;

    fn name(&self) -> &str;
}

/// Object detection pipeline
pub struct DetectionPipeline {
    detector: Arc<dyn Detector>,
}

impl DetectionPipeline {
    /// Create a new detection pipeline
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        Self { detector }
    }

    /// Run the detector on a frame. A failed inference yields no detections
    /// for the cycle; the failure is logged and never surfaces to the caller.
    pub async fn detect(&self, frame: &Frame) -> Vec<Detection> {
        debug!("Running object detection on frame");
        match self.detector.detect(frame).await {
            Ok(detections) => {
                debug!("Detected {} objects", detections.len());
                detections
            }
            Err(e) => {
                warn!("Detector '{}' failed, continuing with no detections: {}", self.detector.name(), e);
                Vec::new()
            }
        }
    }
}
