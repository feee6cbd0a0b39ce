//! Vision processing pipelines

pub mod clearance;
pub mod detection;
pub mod environment;
pub mod tracker;

pub use clearance::{Clearance, ClearanceAnalyzer};
pub use detection::{DetectionPipeline, Detector};
pub use environment::EnvironmentClassifier;
pub use tracker::{ObjectTracker, TrackedObject};
