//! Announcement policy
//!
//! Decides, once per cycle, which confirmed objects get narrated and how.
//! Collision warnings come first; everything else is debounced per object
//! and tiered by detector confidence.

use crate::config::PolicyConfig;
use crate::context::CycleContext;
use crate::translation::TranslationTable;
use drishti_core::{Language, Motion, Priority, Urgency};
use drishti_eye::{Clearance, ObjectTracker, TrackedObject};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementKind {
    /// Very close and approaching: stop now
    Collision,
    /// Confident enough to name the object
    Named,
    /// Too uncertain to name; reported as a generic obstacle
    Obstacle,
}

/// One narration produced by a cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    /// Tracker label the announcement is about
    pub label: String,
    pub text: String,
    pub language: Language,
    pub priority: Priority,
    pub urgency: Urgency,
    pub kind: AnnouncementKind,
}

pub struct AnnouncementPolicy {
    config: PolicyConfig,
}

impl AnnouncementPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Evaluate every confirmed object in tracker order. Emitting an
    /// announcement stamps the object's `last_announced` and `prev_urgency`.
    /// A muted cycle emits and stamps nothing.
    pub fn evaluate(
        &self,
        tracker: &mut ObjectTracker,
        clearance: &Clearance,
        ctx: &CycleContext,
        table: &TranslationTable,
    ) -> Vec<Announcement> {
        if ctx.muted {
            return Vec::new();
        }

        tracker
            .iter_mut()
            .filter(|obj| obj.stability >= self.config.confirm_stability)
            .filter_map(|obj| self.evaluate_object(obj, clearance, ctx, table))
            .collect()
    }

    fn evaluate_object(
        &self,
        obj: &mut TrackedObject,
        clearance: &Clearance,
        ctx: &CycleContext,
        table: &TranslationTable,
    ) -> Option<Announcement> {
        let language = ctx.language;
        let since = obj.since_announced(ctx.now_ms);

        if obj.urgency == Urgency::High
            && obj.motion == Motion::Approaching
            && since.map_or(true, |elapsed| elapsed > self.config.collision_cooldown_ms)
        {
            let name = table.lookup(&obj.label, language);
            let text = table.danger_sentence(&name, obj.zone, language);
            debug!("Collision warning for '{}'", obj.label);
            obj.mark_announced(ctx.now_ms);
            return Some(announcement(obj, text, language, Priority::High, AnnouncementKind::Collision));
        }

        let debounce = if obj.urgency == Urgency::High {
            self.config.debounce_high_ms
        } else {
            self.config.debounce_normal_ms
        };

        // Any change in urgency bypasses the debounce, de-escalation included
        let due = match since {
            None => true,
            Some(elapsed) => elapsed > debounce || obj.prev_urgency != Some(obj.urgency),
        };
        if !due {
            return None;
        }

        let (text, kind) = if obj.confidence >= self.config.clear_confidence {
            let name = table.lookup(&obj.label, language);
            let action = if obj.urgency == Urgency::High {
                table.caution(language)
            } else {
                table.direction(clearance.recommended, language)
            };
            (
                table.named_sentence(&obj.label, &name, obj.zone, obj.urgency, action, language),
                AnnouncementKind::Named,
            )
        } else if obj.confidence >= self.config.probable_confidence {
            let action = table.direction(clearance.recommended, language);
            (
                table.object_sentence(table.obstacle(language), obj.zone, action, language),
                AnnouncementKind::Obstacle,
            )
        } else {
            return None;
        };

        obj.mark_announced(ctx.now_ms);
        Some(announcement(obj, text, language, Priority::Normal, kind))
    }
}

fn announcement(
    obj: &TrackedObject,
    text: String,
    language: Language,
    priority: Priority,
    kind: AnnouncementKind,
) -> Announcement {
    Announcement {
        label: obj.label.clone(),
        text,
        language,
        priority,
        urgency: obj.urgency,
        kind,
    }
}
