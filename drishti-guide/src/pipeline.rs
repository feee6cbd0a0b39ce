//! Per-cycle orchestration
//!
//! Sampler → detector → environment classifier → tracker → clearance →
//! policy → narrator. The pipeline owns all per-cycle state by value and is
//! driven through `&mut self`, so nothing here needs a lock.

use crate::config::PipelineConfig;
use crate::context::{CycleContext, NarrationSettings};
use crate::error::GuidanceError;
use crate::policy::{Announcement, AnnouncementPolicy};
use crate::translation::TranslationTable;
use drishti_core::{BoundingBox, Detection, EnvironmentMode, Language, Millis, Motion, Priority, Urgency, Zone};
use drishti_eye::{
    Clearance, ClearanceAnalyzer, DetectionPipeline, Detector, EnvironmentClassifier, Frame, FrameSampler,
    FrameSource, ObjectTracker, SampleDecision, SamplerStats,
};
use drishti_spk::{Narrator, QueueEntry, Submission, UtteranceOutcome};
use std::sync::Arc;
use tracing::{debug, info};

/// What the UI layer draws for one tracked object
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub bbox: BoundingBox,
    pub display_label: String,
    pub urgency: Urgency,
    pub motion: Motion,
    pub zone: Zone,
    /// Passed multi-cycle confirmation
    pub confirmed: bool,
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub at_ms: Millis,
    /// False when the tick reused the previous inference
    pub inferred: bool,
    /// Raw detector output of the inference this report is based on
    pub detections: Vec<Detection>,
    pub overlays: Vec<Overlay>,
    pub mode: EnvironmentMode,
    pub low_light: bool,
    pub clearance: Clearance,
    pub announcements: Vec<Announcement>,
}

pub struct GuidancePipeline {
    source: Arc<dyn FrameSource>,
    detection: DetectionPipeline,
    sampler: FrameSampler,
    classifier: EnvironmentClassifier,
    tracker: ObjectTracker,
    policy: AnnouncementPolicy,
    table: TranslationTable,
    narrator: Narrator,
    low_light_threshold: f32,
    confirm_stability: u8,
    last_report: Option<CycleReport>,
}

impl GuidancePipeline {
    pub fn new(
        config: &PipelineConfig,
        source: Arc<dyn FrameSource>,
        detector: Arc<dyn Detector>,
        narrator: Narrator,
    ) -> Result<Self, GuidanceError> {
        config.validate().map_err(GuidanceError::Config)?;

        info!(
            "Guidance pipeline ready (inference every {} ms, narration via {})",
            config.vision.min_inference_interval_ms,
            narrator.engine_name()
        );

        Ok(Self {
            source,
            detection: DetectionPipeline::new(detector),
            sampler: FrameSampler::new(config.vision.min_inference_interval_ms),
            classifier: EnvironmentClassifier::new(&config.vision),
            tracker: ObjectTracker::new(&config.vision),
            policy: AnnouncementPolicy::new(config.policy.clone()),
            table: TranslationTable::builtin(),
            narrator,
            low_light_threshold: config.vision.low_light_threshold,
            confirm_stability: config.policy.confirm_stability,
            last_report: None,
        })
    }

    /// Replace the bundled translation table
    pub fn with_translations(mut self, table: TranslationTable) -> Self {
        self.table = table;
        self
    }

    /// Run one display tick. Returns `None` while the frame source is not
    /// streaming; a reuse tick returns the previous overlays and the
    /// sampler's cached detections without touching the tracker or narrating.
    pub async fn tick(&mut self, settings: NarrationSettings, now_ms: Millis) -> Option<CycleReport> {
        match self.sampler.poll(self.source.as_ref(), now_ms) {
            SampleDecision::NotReady => None,
            SampleDecision::Reuse => self.last_report.as_ref().map(|last| CycleReport {
                inferred: false,
                detections: self.sampler.cached().to_vec(),
                announcements: Vec::new(),
                ..last.clone()
            }),
            SampleDecision::Infer(frame) => {
                let detections = self.detection.detect(&frame).await;
                let ctx = settings.context(now_ms, frame.size);
                Some(self.run_cycle(&frame, &detections, &ctx))
            }
        }
    }

    /// Process one inference cycle and hand its announcements to the
    /// narrator. `ctx.frame` is the size of `frame`.
    pub fn run_cycle(&mut self, frame: &Frame, detections: &[Detection], ctx: &CycleContext) -> CycleReport {
        let mode = self.classifier.observe(detections);

        let relevant: Vec<Detection> = detections
            .iter()
            .filter(|d| self.classifier.is_relevant(d))
            .cloned()
            .collect();

        // Sweep first so a class returning after the eviction window starts cold
        for evicted in self.tracker.sweep(ctx.now_ms) {
            debug!("'{}' left the scene", evicted.label);
        }
        self.tracker.update(&relevant, ctx.frame, ctx.now_ms);

        let clearance = ClearanceAnalyzer::analyze(detections, ctx.frame);
        let announcements = self.policy.evaluate(&mut self.tracker, &clearance, ctx, &self.table);

        for announcement in &announcements {
            let entry = QueueEntry::new(announcement.text.clone(), announcement.language, announcement.priority);
            let submission = self.narrator.submit(entry);
            debug!("Announcement \"{}\": {:?}", announcement.text, submission);
        }

        self.sampler.store(detections.to_vec());

        let report = CycleReport {
            at_ms: ctx.now_ms,
            inferred: true,
            detections: detections.to_vec(),
            overlays: self.overlays(ctx),
            mode,
            low_light: frame.is_low_light(self.low_light_threshold),
            clearance,
            announcements,
        };
        self.last_report = Some(report.clone());
        report
    }

    /// Objects seen this cycle, in tracker order
    fn overlays(&self, ctx: &CycleContext) -> Vec<Overlay> {
        self.tracker
            .iter()
            .filter(|obj| obj.last_seen == ctx.now_ms)
            .map(|obj| Overlay {
                bbox: obj.smoothed_box,
                display_label: self.table.lookup(&obj.label, ctx.language),
                urgency: obj.urgency,
                motion: obj.motion,
                zone: obj.zone,
                confirmed: obj.stability >= self.confirm_stability,
            })
            .collect()
    }

    /// Speak the startup notice; `on_complete` fires once it has been spoken
    /// or dropped
    pub fn welcome<F>(&self, language: Language, on_complete: F) -> Submission
    where
        F: FnOnce(UtteranceOutcome) + Send + 'static,
    {
        let entry = QueueEntry::new(self.table.welcome(language), language, Priority::Normal).with_callback(on_complete);
        self.narrator.submit(entry)
    }

    /// Forget all tracking state, e.g. after the camera restarts
    pub fn reset(&mut self) {
        self.tracker.clear();
        self.sampler.reset();
        self.last_report = None;
    }

    pub fn mode(&self) -> EnvironmentMode {
        self.classifier.mode()
    }

    pub fn tracker(&self) -> &ObjectTracker {
        &self.tracker
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn sampler_stats(&self) -> SamplerStats {
        self.sampler.stats()
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }
}
