//! drishti-guide: turns tracked objects into spoken guidance
//!
//! Wires the perception stage (`drishti-eye`) to the narration channel
//! (`drishti-spk`): per-cycle orchestration, the announcement policy,
//! phrase tables and the tick-driven service.

pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod service;
pub mod translation;

pub use config::{PipelineConfig, PolicyConfig};
pub use context::{CycleContext, NarrationSettings};
pub use error::GuidanceError;
pub use pipeline::{CycleReport, GuidancePipeline, Overlay};
pub use policy::{Announcement, AnnouncementKind, AnnouncementPolicy};
pub use service::{GuidanceService, ServiceStatus};
pub use translation::TranslationTable;
