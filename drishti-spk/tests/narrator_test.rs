//! Tests for the narration channel against a gated engine

use async_trait::async_trait;
use drishti_core::{Language, Priority};
use drishti_spk::{
    NarrationConfig, NarrationEngine, Narrator, QueueEntry, SpeechError, Submission, UtteranceOutcome,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Engine whose utterances only finish when the test releases them
struct GatedEngine {
    started: Mutex<Vec<(String, Language)>>,
    gate: Option<Semaphore>,
    voices: Vec<Language>,
    /// Languages that report a voice but fail at speak time
    broken_voices: Vec<Language>,
}

impl GatedEngine {
    fn gated() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
            voices: vec![Language::English, Language::Tamil],
            broken_voices: Vec::new(),
        }
    }

    fn open() -> Self {
        Self {
            gate: None,
            ..Self::gated()
        }
    }

    fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    fn started(&self) -> Vec<String> {
        self.started.lock().iter().map(|(text, _)| text.clone()).collect()
    }

    async fn wait_started(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.started.lock().len() < count {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("engine never started speaking");
    }
}

#[async_trait]
impl NarrationEngine for GatedEngine {
    async fn speak(&self, text: &str, language: Language) -> Result<(), SpeechError> {
        self.started.lock().push((text.to_string(), language));

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| SpeechError::Engine(e.to_string()))?
                .forget();
        }

        if self.broken_voices.contains(&language) {
            return Err(SpeechError::VoiceUnavailable(language.tag().to_string()));
        }
        if text.starts_with("fail") {
            return Err(SpeechError::Engine("synthesis crashed".to_string()));
        }
        Ok(())
    }

    fn has_voice(&self, language: Language) -> bool {
        self.voices.contains(&language)
    }

    fn name(&self) -> &str {
        "gated"
    }
}

type Outcomes = Arc<Mutex<Vec<(String, UtteranceOutcome)>>>;

fn entry(text: &str, priority: Priority, outcomes: &Outcomes) -> QueueEntry {
    let log = outcomes.clone();
    let label = text.to_string();
    QueueEntry::new(text, Language::English, priority).with_callback(move |outcome| {
        log.lock().push((label, outcome));
    })
}

fn outcome_of(outcomes: &Outcomes, text: &str) -> Vec<UtteranceOutcome> {
    outcomes
        .lock()
        .iter()
        .filter(|(t, _)| t == text)
        .map(|(_, o)| *o)
        .collect()
}

async fn settle(narrator: &Narrator) {
    tokio::time::timeout(Duration::from_secs(2), narrator.wait_idle())
        .await
        .expect("narrator never went idle");
}

#[tokio::test]
async fn test_high_priority_preempts_speech_and_backlog() {
    let engine = Arc::new(GatedEngine::gated());
    let narrator = Narrator::new(engine.clone(), NarrationConfig::default()).unwrap();
    let outcomes: Outcomes = Arc::default();

    assert_eq!(narrator.submit(entry("Chair on your left", Priority::Normal, &outcomes)), Submission::Started);
    engine.wait_started(1).await;
    assert_eq!(narrator.submit(entry("Table ahead", Priority::Normal, &outcomes)), Submission::Queued(0));
    assert_eq!(narrator.submit(entry("Door on your right", Priority::Normal, &outcomes)), Submission::Queued(1));

    let danger = "Warning! Car very close ahead. Stop immediately.";
    assert_eq!(narrator.submit(entry(danger, Priority::High, &outcomes)), Submission::Preempted);
    assert_eq!(narrator.pending_len(), 0);
    assert_eq!(narrator.current_text().as_deref(), Some(danger));

    engine.wait_started(2).await;
    engine.release(1);
    settle(&narrator).await;

    assert_eq!(engine.started(), vec!["Chair on your left", danger]);
    assert_eq!(outcome_of(&outcomes, "Chair on your left"), vec![UtteranceOutcome::Cancelled]);
    assert_eq!(outcome_of(&outcomes, "Table ahead"), vec![UtteranceOutcome::Dropped]);
    assert_eq!(outcome_of(&outcomes, "Door on your right"), vec![UtteranceOutcome::Dropped]);
    assert_eq!(outcome_of(&outcomes, danger), vec![UtteranceOutcome::Spoken]);
}

#[tokio::test]
async fn test_third_pending_request_is_shed() {
    let engine = Arc::new(GatedEngine::gated());
    let narrator = Narrator::new(engine.clone(), NarrationConfig::default()).unwrap();
    let outcomes: Outcomes = Arc::default();

    narrator.submit(entry("one", Priority::Normal, &outcomes));
    narrator.submit(entry("two", Priority::Normal, &outcomes));
    narrator.submit(entry("three", Priority::Normal, &outcomes));
    assert_eq!(narrator.submit(entry("four", Priority::Normal, &outcomes)), Submission::Shed);
    assert_eq!(narrator.pending_len(), 2);
    assert_eq!(outcome_of(&outcomes, "four"), vec![UtteranceOutcome::Dropped]);

    engine.release(3);
    settle(&narrator).await;
    assert_eq!(engine.started(), vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_duplicate_pending_text_dropped() {
    let engine = Arc::new(GatedEngine::gated());
    let narrator = Narrator::new(engine.clone(), NarrationConfig::default()).unwrap();
    let outcomes: Outcomes = Arc::default();

    narrator.submit(entry("Person ahead", Priority::Normal, &outcomes));
    narrator.submit(entry("Bench on your left", Priority::Normal, &outcomes));
    assert_eq!(
        narrator.submit(entry("Bench on your left", Priority::Normal, &outcomes)),
        Submission::Deduplicated
    );

    engine.release(2);
    settle(&narrator).await;
    assert_eq!(engine.started(), vec!["Person ahead", "Bench on your left"]);
    assert_eq!(
        outcome_of(&outcomes, "Bench on your left"),
        vec![UtteranceOutcome::Dropped, UtteranceOutcome::Spoken]
    );
}

#[tokio::test]
async fn test_every_callback_fires_exactly_once() {
    let engine = Arc::new(GatedEngine::gated());
    let narrator = Narrator::new(engine.clone(), NarrationConfig::default()).unwrap();
    let outcomes: Outcomes = Arc::default();

    let texts = ["a", "b", "c", "d", "e"];
    for text in texts {
        narrator.submit(entry(text, Priority::Normal, &outcomes));
    }
    narrator.submit(entry("danger", Priority::High, &outcomes));
    engine.release(10);
    settle(&narrator).await;

    let log = outcomes.lock();
    assert_eq!(log.len(), texts.len() + 1);
    for text in texts.iter().chain(std::iter::once(&"danger")) {
        assert_eq!(log.iter().filter(|(t, _)| t == text).count(), 1, "callback count for {}", text);
    }
}

#[tokio::test]
async fn test_missing_voice_speaks_fallback_notice() {
    let engine = Arc::new(GatedEngine {
        voices: vec![Language::English],
        ..GatedEngine::open()
    });
    let config = NarrationConfig::default();
    let narrator = Narrator::new(engine.clone(), config.clone()).unwrap();
    let outcomes: Outcomes = Arc::default();

    let log = outcomes.clone();
    narrator.submit(
        QueueEntry::new("நாற்காலி இடதுபுறம்", Language::Tamil, Priority::Normal)
            .with_callback(move |outcome| log.lock().push(("tamil".to_string(), outcome))),
    );
    settle(&narrator).await;

    let started = engine.started.lock().clone();
    assert_eq!(started, vec![(config.fallback_phrase.clone(), Language::English)]);
    assert_eq!(outcome_of(&outcomes, "tamil"), vec![UtteranceOutcome::Substituted]);
}

#[tokio::test]
async fn test_voice_failure_at_speak_time_falls_back() {
    let engine = Arc::new(GatedEngine {
        broken_voices: vec![Language::Tamil],
        ..GatedEngine::open()
    });
    let config = NarrationConfig::default();
    let narrator = Narrator::new(engine.clone(), config.clone()).unwrap();

    narrator.say("மேசை முன்னால்", Language::Tamil, Priority::Normal);
    settle(&narrator).await;

    let started = engine.started();
    assert_eq!(started.len(), 2);
    assert_eq!(started[1], config.fallback_phrase);
}

#[tokio::test]
async fn test_engine_failure_does_not_wedge_channel() {
    let engine = Arc::new(GatedEngine::open());
    let narrator = Narrator::new(engine.clone(), NarrationConfig::default()).unwrap();
    let outcomes: Outcomes = Arc::default();

    narrator.submit(entry("fail loudly", Priority::Normal, &outcomes));
    narrator.submit(entry("Stairs ahead", Priority::Normal, &outcomes));
    settle(&narrator).await;

    assert_eq!(outcome_of(&outcomes, "fail loudly"), vec![UtteranceOutcome::Failed]);
    assert_eq!(outcome_of(&outcomes, "Stairs ahead"), vec![UtteranceOutcome::Spoken]);

    assert_eq!(narrator.say("Bus stop ahead", Language::English, Priority::Normal), Submission::Started);
    settle(&narrator).await;
}

#[tokio::test]
async fn test_panicking_callback_does_not_wedge_channel() {
    let engine = Arc::new(GatedEngine::open());
    let narrator = Narrator::new(engine.clone(), NarrationConfig::default()).unwrap();
    let outcomes: Outcomes = Arc::default();

    let faulty = QueueEntry::new("one", Language::English, Priority::Normal)
        .with_callback(|_| panic!("callback blew up"));
    narrator.submit(faulty);
    narrator.submit(entry("two", Priority::Normal, &outcomes));
    narrator.submit(entry("three", Priority::Normal, &outcomes));
    settle(&narrator).await;

    assert_eq!(engine.started(), vec!["one", "two", "three"]);
    assert_eq!(outcome_of(&outcomes, "two"), vec![UtteranceOutcome::Spoken]);
    assert_eq!(outcome_of(&outcomes, "three"), vec![UtteranceOutcome::Spoken]);
    assert!(!narrator.is_speaking());
    assert_eq!(narrator.pending_len(), 0);

    assert_eq!(narrator.say("Bus stop ahead", Language::English, Priority::Normal), Submission::Started);
    settle(&narrator).await;
}

#[tokio::test]
async fn test_shutdown_cancels_and_rejects() {
    let engine = Arc::new(GatedEngine::gated());
    let narrator = Narrator::new(engine.clone(), NarrationConfig::default()).unwrap();
    let outcomes: Outcomes = Arc::default();

    narrator.submit(entry("one", Priority::Normal, &outcomes));
    narrator.submit(entry("two", Priority::Normal, &outcomes));
    engine.wait_started(1).await;

    narrator.shutdown();
    settle(&narrator).await;

    assert_eq!(outcome_of(&outcomes, "one"), vec![UtteranceOutcome::Cancelled]);
    assert_eq!(outcome_of(&outcomes, "two"), vec![UtteranceOutcome::Dropped]);
    assert_eq!(
        narrator.submit(entry("three", Priority::High, &outcomes)),
        Submission::Rejected
    );
    assert_eq!(outcome_of(&outcomes, "three"), vec![UtteranceOutcome::Dropped]);

    engine.release(5);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(engine.started(), vec!["one"]);
}
