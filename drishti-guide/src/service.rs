//! Guidance service: drives the pipeline at the display refresh rate

use crate::context::NarrationSettings;
use crate::error::GuidanceError;
use crate::pipeline::{CycleReport, GuidancePipeline};
use drishti_core::{EnvironmentMode, Language, Millis};
use drishti_spk::{Narrator, UtteranceOutcome};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Snapshot published after every processed tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceStatus {
    pub running: bool,
    /// Welcome notice finished (spoken or dropped)
    pub welcomed: bool,
    pub mode: EnvironmentMode,
    pub low_light: bool,
    pub cycles: u64,
    pub announcements: u64,
    pub last_cycle_ms: Option<Millis>,
}

pub struct GuidanceService {
    pipeline: Arc<Mutex<Option<GuidancePipeline>>>,
    narrator: Narrator,
    tick_ms: u64,
    announce_welcome: bool,
    settings: watch::Sender<NarrationSettings>,
    status: Arc<watch::Sender<ServiceStatus>>,
    reports: Arc<watch::Sender<Option<CycleReport>>>,
    is_running: Arc<RwLock<bool>>,
    handle: Mutex<Option<JoinHandle<GuidancePipeline>>>,
    halt: Mutex<Option<oneshot::Sender<()>>>,
}

impl GuidanceService {
    pub fn new(pipeline: GuidancePipeline, tick_ms: u64, language: Language, announce_welcome: bool) -> Self {
        let narrator = pipeline.narrator().clone();
        let (settings, _) = watch::channel(NarrationSettings { language, muted: false });
        let (status, _) = watch::channel(ServiceStatus::default());
        let (reports, _) = watch::channel(None);

        Self {
            pipeline: Arc::new(Mutex::new(Some(pipeline))),
            narrator,
            tick_ms: tick_ms.max(1),
            announce_welcome,
            settings,
            status: Arc::new(status),
            reports: Arc::new(reports),
            is_running: Arc::new(RwLock::new(false)),
            handle: Mutex::new(None),
            halt: Mutex::new(None),
        }
    }

    /// Start the tick loop. Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), GuidanceError> {
        {
            let mut is_running = self.is_running.write();
            if *is_running {
                return Err(GuidanceError::AlreadyRunning);
            }
            *is_running = true;
        }

        let Some(mut pipeline) = self.pipeline.lock().take() else {
            *self.is_running.write() = false;
            return Err(GuidanceError::PipelineLost);
        };

        self.narrator.resume();
        info!("Starting guidance service ({} ms per tick)", self.tick_ms);
        self.status.send_modify(|s| {
            s.running = true;
            s.welcomed = !self.announce_welcome;
        });

        let (halt_tx, mut halt_rx) = oneshot::channel::<()>();
        let mut settings_rx = self.settings.subscribe();
        let status = self.status.clone();
        let reports = self.reports.clone();
        let is_running = self.is_running.clone();
        let announce_welcome = self.announce_welcome;
        let tick_ms = self.tick_ms;

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = interval(Duration::from_millis(tick_ms));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut language = settings_rx.borrow_and_update().language;
            if announce_welcome {
                Self::welcome(&pipeline, language, &status);
            }

            // Stopping drops whatever cycle is in flight so the pipeline always comes back
            loop {
                tokio::select! {
                    biased;
                    _ = &mut halt_rx => break,
                    _ = ticker.tick() => {}
                }
                if !*is_running.read() {
                    break;
                }

                let settings = *settings_rx.borrow_and_update();
                if settings.language != language {
                    language = settings.language;
                    info!("Narration language changed to {}", language);
                    Self::welcome(&pipeline, language, &status);
                }

                let now_ms = started.elapsed().as_millis() as Millis;
                let report = tokio::select! {
                    biased;
                    _ = &mut halt_rx => break,
                    report = pipeline.tick(settings, now_ms) => report,
                };
                let Some(report) = report else {
                    continue;
                };

                if report.inferred {
                    status.send_modify(|s| {
                        s.mode = report.mode;
                        s.low_light = report.low_light;
                        s.cycles += 1;
                        s.announcements += report.announcements.len() as u64;
                        s.last_cycle_ms = Some(report.at_ms);
                    });
                }
                reports.send_replace(Some(report));
            }

            debug!("Guidance tick loop exited");
            pipeline
        });

        *self.handle.lock() = Some(handle);
        *self.halt.lock() = Some(halt_tx);
        Ok(())
    }

    fn welcome(pipeline: &GuidancePipeline, language: Language, status: &Arc<watch::Sender<ServiceStatus>>) {
        let status = status.clone();
        pipeline.welcome(language, move |outcome| {
            if outcome != UtteranceOutcome::Spoken {
                debug!("Welcome notice ended as {:?}", outcome);
            }
            status.send_modify(|s| s.welcomed = true);
        });
    }

    /// Stop ticking and silence the narrator. No detections are processed
    /// once this returns.
    pub async fn stop(&self) {
        {
            let mut is_running = self.is_running.write();
            if !*is_running {
                return;
            }
            *is_running = false;
        }

        if let Some(halt) = self.halt.lock().take() {
            let _ = halt.send(());
        }
        self.narrator.shutdown();

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let abort = handle.abort_handle();
            match tokio::time::timeout(Duration::from_secs(1), handle).await {
                Ok(Ok(mut pipeline)) => {
                    pipeline.reset();
                    *self.pipeline.lock() = Some(pipeline);
                }
                Ok(Err(e)) => warn!("Guidance tick loop ended abnormally: {}", e),
                Err(_) => {
                    error!("Guidance tick loop did not stop in time, aborting; the pipeline is lost");
                    abort.abort();
                }
            }
        }

        self.status.send_modify(|s| s.running = false);
        info!("Guidance service stopped");
    }

    pub fn set_language(&self, language: Language) {
        self.settings.send_modify(|s| s.language = language);
    }

    /// Switch between the supported languages, returning the new one
    pub fn toggle_language(&self) -> Language {
        let mut next = Language::English;
        self.settings.send_modify(|s| {
            s.language = match s.language {
                Language::English => Language::Tamil,
                Language::Tamil => Language::English,
            };
            next = s.language;
        });
        next
    }

    pub fn set_muted(&self, muted: bool) {
        self.settings.send_modify(|s| s.muted = muted);
    }

    pub fn settings(&self) -> NarrationSettings {
        *self.settings.borrow()
    }

    pub fn status(&self) -> ServiceStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ServiceStatus> {
        self.status.subscribe()
    }

    /// Latest cycle report, updated every processed tick
    pub fn subscribe_reports(&self) -> watch::Receiver<Option<CycleReport>> {
        self.reports.subscribe()
    }

    pub fn is_running(&self) -> bool {
        *self.is_running.read()
    }
}
