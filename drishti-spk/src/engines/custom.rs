//! Custom narration engine implementation
//! Lets callers plug any speech backend in through closures

use crate::engines::NarrationEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use drishti_core::Language;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type SpeakFuture = Pin<Box<dyn Future<Output = Result<(), SpeechError>> + Send>>;

type SpeakFn = Arc<dyn Fn(String, Language) -> SpeakFuture + Send + Sync>;
type HasVoiceFn = Arc<dyn Fn(Language) -> bool + Send + Sync>;
type CancelFn = Arc<dyn Fn() + Send + Sync>;

/// Closure-backed narration engine
pub struct CustomNarrationEngine {
    name: String,
    speak_fn: SpeakFn,
    has_voice_fn: HasVoiceFn,
    cancel_fn: Option<CancelFn>,
}

impl CustomNarrationEngine {
    /// Create a new custom engine
    pub fn new<F1, F2>(name: impl Into<String>, speak_fn: F1, has_voice_fn: F2) -> Self
    where
        F1: Fn(String, Language) -> SpeakFuture + Send + Sync + 'static,
        F2: Fn(Language) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            speak_fn: Arc::new(speak_fn),
            has_voice_fn: Arc::new(has_voice_fn),
            cancel_fn: None,
        }
    }

    /// Hook invoked when the narrator cancels in-flight speech
    pub fn with_cancel<F>(mut self, cancel_fn: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.cancel_fn = Some(Arc::new(cancel_fn));
        self
    }
}

#[async_trait]
impl NarrationEngine for CustomNarrationEngine {
    async fn speak(&self, text: &str, language: Language) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::Engine("Text cannot be empty".to_string()));
        }

        if text.len() > 10_000 {
            return Err(SpeechError::Engine("Text too long (max 10KB)".to_string()));
        }

        (self.speak_fn)(text.to_string(), language).await
    }

    fn has_voice(&self, language: Language) -> bool {
        (self.has_voice_fn)(language)
    }

    fn cancel(&self) {
        if let Some(cancel) = &self.cancel_fn {
            cancel();
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
