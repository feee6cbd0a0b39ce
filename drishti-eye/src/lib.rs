//! drishti-eye: perception stage of the guidance pipeline
//!
//! Throttles detector invocations, infers whether the user is indoors or
//! outdoors, tracks detected classes across frames and summarises which
//! side of the path is clearer.

pub mod camera;
pub mod config;
pub mod error;
pub mod processing;
pub mod sampler;

pub use camera::{Frame, FrameSource};
pub use config::VisionConfig;
pub use error::VisionError;
pub use processing::{
    Clearance, ClearanceAnalyzer, DetectionPipeline, Detector, EnvironmentClassifier, ObjectTracker,
    TrackedObject,
};
pub use sampler::{FrameSampler, SampleDecision, SamplerStats};
