//! Per-class object tracking
//!
//! Objects are keyed by class label: every instance of a class in view
//! collapses into one entry, represented by its largest (closest) box.

use crate::config::VisionConfig;
use drishti_core::{BoundingBox, Detection, Distance, FrameSize, Millis, Motion, Urgency, Zone};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Highest value the stability counter reaches
pub const MAX_STABILITY: u8 = 5;

/// Tracked state of one class label
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    pub label: String,
    pub smoothed_box: BoundingBox,
    /// Score of the most recent detection
    pub confidence: f32,
    pub stability: u8,
    pub motion: Motion,
    pub urgency: Urgency,
    pub zone: Zone,
    pub first_seen: Millis,
    pub last_seen: Millis,
    pub last_announced: Option<Millis>,
    /// Urgency at the time of the last announcement
    pub prev_urgency: Option<Urgency>,
    last_area_ratio: f32,
}

impl TrackedObject {
    fn new(label: String, detection: &Detection, area_ratio: f32, now_ms: Millis) -> Self {
        Self {
            label,
            smoothed_box: detection.bbox,
            confidence: detection.score,
            stability: 0,
            motion: Motion::Static,
            urgency: Urgency::Low,
            zone: Zone::Center,
            first_seen: now_ms,
            last_seen: now_ms,
            last_announced: None,
            prev_urgency: None,
            last_area_ratio: area_ratio,
        }
    }

    pub fn distance(&self) -> Distance {
        self.urgency.distance()
    }

    /// Milliseconds since the last announcement, `None` if never announced
    pub fn since_announced(&self, now_ms: Millis) -> Option<Millis> {
        self.last_announced.map(|t| now_ms.saturating_sub(t))
    }

    /// Record that an announcement about this object was emitted
    pub fn mark_announced(&mut self, now_ms: Millis) {
        self.last_announced = Some(now_ms);
        self.prev_urgency = Some(self.urgency);
    }
}

/// Multi-class object tracker
pub struct ObjectTracker {
    tracks: BTreeMap<String, TrackedObject>,
    smoothing_retain: f32,
    stable_delta_fraction: f32,
    approach_area_delta: f32,
    lateral_delta_fraction: f32,
    high_area_ratio: f32,
    medium_area_ratio: f32,
    eviction_ms: Millis,
    max_tracks: usize,
}

impl ObjectTracker {
    /// Create a new object tracker
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            tracks: BTreeMap::new(),
            smoothing_retain: config.smoothing_retain,
            stable_delta_fraction: config.stable_delta_fraction,
            approach_area_delta: config.approach_area_delta,
            lateral_delta_fraction: config.lateral_delta_fraction,
            high_area_ratio: config.high_area_ratio,
            medium_area_ratio: config.medium_area_ratio,
            eviction_ms: config.eviction_ms,
            max_tracks: config.max_tracks,
        }
    }

    /// Ingest one cycle of relevance-filtered detections.
    /// Returns the number of labels updated.
    pub fn update(&mut self, detections: &[Detection], frame: FrameSize, now_ms: Millis) -> usize {
        if frame.is_empty() {
            warn!("Ignoring detections for empty frame {}x{}", frame.width, frame.height);
            return 0;
        }

        // Collapse instances sharing a label to the closest one
        let mut per_label: BTreeMap<String, &Detection> = BTreeMap::new();
        for det in detections {
            if !det.bbox.is_valid() || !det.score.is_finite() {
                debug!("Rejecting malformed detection for '{}'", det.label);
                continue;
            }
            let key = normalize_label(&det.label);
            if key.is_empty() {
                continue;
            }
            match per_label.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(det);
                }
                Entry::Occupied(mut slot) => {
                    if det.bbox.area() > slot.get().bbox.area() {
                        slot.insert(det);
                    }
                }
            }
        }

        let updated = per_label.len();
        for (key, det) in per_label {
            self.observe(key, det, frame, now_ms);
        }
        debug!("Tracking {} objects", self.tracks.len());
        updated
    }

    fn observe(&mut self, key: String, det: &Detection, frame: FrameSize, now_ms: Millis) {
        let frame_area = frame.area();
        let area_ratio = det.bbox.area() / frame_area;

        if !self.tracks.contains_key(&key) && self.tracks.len() >= self.max_tracks {
            self.evict_least_recent();
        }

        let stable_px = self.stable_delta_fraction * frame.diagonal();
        let lateral_px = self.lateral_delta_fraction * frame.width as f32;
        let retain = self.smoothing_retain;
        let approach = self.approach_area_delta;
        let (high, medium) = (self.high_area_ratio, self.medium_area_ratio);

        let obj = self
            .tracks
            .entry(key)
            .or_insert_with_key(|k| TrackedObject::new(k.clone(), det, area_ratio, now_ms));

        // Positional delta against the previous smoothed estimate; a fresh
        // entry compares against its own first box.
        let (prev_cx, prev_cy) = obj.smoothed_box.center();
        let (new_cx, new_cy) = det.bbox.center();
        let dx = (new_cx - prev_cx).abs();
        let dy = (new_cy - prev_cy).abs();

        if dx < stable_px && dy < stable_px {
            obj.stability = (obj.stability + 1).min(MAX_STABILITY);
        } else {
            obj.stability = obj.stability.saturating_sub(1);
        }

        obj.motion = if area_ratio - obj.last_area_ratio > approach {
            Motion::Approaching
        } else if dx > lateral_px {
            Motion::Lateral
        } else {
            Motion::Static
        };

        obj.smoothed_box = obj.smoothed_box.blend(&det.bbox, retain);
        obj.urgency = classify_urgency(obj.smoothed_box.area() / frame_area, high, medium);
        obj.zone = Zone::from_relative_x(obj.smoothed_box.center().0 / frame.width as f32);
        obj.last_area_ratio = area_ratio;
        obj.confidence = det.score;
        obj.last_seen = now_ms;
    }

    /// Evict every object unseen for longer than the eviction window.
    /// Evicted records come back with stability reset: a returning class
    /// starts a fresh entry and has to earn confirmation again.
    pub fn sweep(&mut self, now_ms: Millis) -> Vec<TrackedObject> {
        let expired: Vec<String> = self
            .tracks
            .iter()
            .filter(|(_, t)| now_ms.saturating_sub(t.last_seen) > self.eviction_ms)
            .map(|(k, _)| k.clone())
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for key in expired {
            if let Some(mut obj) = self.tracks.remove(&key) {
                obj.stability = 0;
                debug!("Evicted '{}' after {} ms unseen", obj.label, now_ms.saturating_sub(obj.last_seen));
                evicted.push(obj);
            }
        }
        evicted
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .tracks
            .iter()
            .min_by_key(|(_, t)| t.last_seen)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            warn!("Track limit {} reached, dropping '{}'", self.max_tracks, key);
            self.tracks.remove(&key);
        }
    }

    pub fn get(&self, label: &str) -> Option<&TrackedObject> {
        self.tracks.get(&normalize_label(label))
    }

    /// Tracked objects in deterministic label order
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.tracks.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedObject> {
        self.tracks.values_mut()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

fn classify_urgency(area_ratio: f32, high: f32, medium: f32) -> Urgency {
    if area_ratio > high {
        Urgency::High
    } else if area_ratio > medium {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}
