//! Scripted scenes: a JSON timeline of detector output standing in for a
//! live camera and model

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use drishti_core::{Detection, FrameSize, Millis};
use drishti_eye::{Detector, Frame, FrameSource, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptFrame {
    pub at_ms: Millis,
    #[serde(default)]
    pub luminance: Option<f32>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<ScriptFrame>,
}

impl Script {
    pub fn from_json(content: &str) -> Result<Self> {
        let mut script: Script = serde_json::from_str(content).context("Invalid scene script")?;
        if script.width == 0 || script.height == 0 {
            bail!("Scene script frame size must be non-zero");
        }
        if script.frames.is_empty() {
            bail!("Scene script has no frames");
        }
        script.frames.sort_by_key(|f| f.at_ms);
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// Time of the last keyframe
    pub fn duration_ms(&self) -> Millis {
        self.frames.last().map(|f| f.at_ms).unwrap_or(0)
    }

    /// Latest keyframe at or before `at_ms`
    pub fn frame_at(&self, at_ms: Millis) -> Option<&ScriptFrame> {
        self.frames.iter().take_while(|f| f.at_ms <= at_ms).last()
    }
}

/// Where the scene reads the current time from
pub enum SceneClock {
    /// Advanced explicitly by the caller
    Manual(AtomicU64),
    /// Wall time since start, wrapping after `period_ms`
    Looping { started: Instant, period_ms: Millis },
}

impl SceneClock {
    fn now(&self) -> Millis {
        match self {
            SceneClock::Manual(at) => at.load(Ordering::SeqCst),
            SceneClock::Looping { started, period_ms } => {
                let elapsed = started.elapsed().as_millis() as Millis;
                elapsed % (*period_ms).max(1)
            }
        }
    }
}

/// Plays a script back as both frame source and detector
pub struct ScriptedScene {
    script: Script,
    clock: SceneClock,
}

impl ScriptedScene {
    pub fn manual(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            clock: SceneClock::Manual(AtomicU64::new(0)),
        })
    }

    /// Loop the script forever; one pass lasts until a tick past the last keyframe
    pub fn looping(script: Script, tick_ms: Millis) -> Arc<Self> {
        let period_ms = script.duration_ms() + tick_ms.max(1);
        Arc::new(Self {
            script,
            clock: SceneClock::Looping {
                started: Instant::now(),
                period_ms,
            },
        })
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn set_time(&self, at_ms: Millis) {
        if let SceneClock::Manual(at) = &self.clock {
            at.store(at_ms, Ordering::SeqCst);
        }
    }
}

impl FrameSource for ScriptedScene {
    fn is_ready(&self) -> bool {
        self.script.frame_at(self.clock.now()).is_some()
    }

    fn frame_size(&self) -> FrameSize {
        self.script.frame_size()
    }

    fn capture(&self) -> Option<Frame> {
        let at_ms = self.clock.now();
        let keyframe = self.script.frame_at(at_ms)?;
        let frame = Frame::new(self.script.frame_size(), at_ms);
        Some(match keyframe.luminance {
            Some(luminance) => frame.with_luminance(luminance),
            None => frame,
        })
    }
}

#[async_trait]
impl Detector for ScriptedScene {
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, VisionError> {
        self.script
            .frame_at(frame.captured_at_ms)
            .map(|f| f.detections.clone())
            .ok_or_else(|| VisionError::Detector(format!("No keyframe at {} ms", frame.captured_at_ms)))
    }

    fn name(&self) -> &str {
        "script"
    }
}
