//! espeak-ng narration engine (plays straight to the default audio device)

use crate::config::NarrationConfig;
use crate::engines::NarrationEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use drishti_core::Language;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub struct EspeakEngine {
    available: bool,
    voices: Vec<String>,
    rate: u32,
    volume: f32,
    pitch: f32,
}

impl EspeakEngine {
    /// Look for espeak-ng and load its voice list
    pub fn new(config: &NarrationConfig) -> Self {
        let available = std::process::Command::new("espeak-ng")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);

        let voices = if available { list_voices() } else { Vec::new() };
        if available {
            info!("espeak-ng available with {} voices", voices.len());
        } else {
            warn!("espeak-ng not found on PATH");
        }

        Self::with_voices(available, voices, config)
    }

    fn with_voices(available: bool, voices: Vec<String>, config: &NarrationConfig) -> Self {
        Self {
            available,
            voices,
            rate: config.rate,
            volume: config.volume,
            pitch: config.pitch,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn voice_for(&self, language: Language) -> Option<&str> {
        let code = language.code();
        self.voices
            .iter()
            .find(|v| v.as_str() == code || v.starts_with(&format!("{}-", code)))
            .map(String::as_str)
    }
}

fn list_voices() -> Vec<String> {
    let output = match std::process::Command::new("espeak-ng").arg("--voices").output() {
        Ok(o) if o.status.success() => o,
        _ => return Vec::new(),
    };

    parse_voice_list(&String::from_utf8_lossy(&output.stdout))
}

/// Second column of `espeak-ng --voices` is the language tag
fn parse_voice_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter(|v| v.len() <= 32 && !v.chars().any(|c| c.is_control()))
        .map(|v| v.to_ascii_lowercase())
        .take(1000)
        .collect()
}

/// Strip control characters and leading dashes so text is never read as a flag
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim_start_matches('-')
        .trim()
        .to_string()
}

#[async_trait]
impl NarrationEngine for EspeakEngine {
    async fn speak(&self, text: &str, language: Language) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::Engine("espeak-ng not available".to_string()));
        }

        let voice = self
            .voice_for(language)
            .ok_or_else(|| SpeechError::VoiceUnavailable(format!("no espeak-ng voice for {}", language)))?
            .to_string();

        let text = sanitize(text);
        if text.is_empty() {
            return Err(SpeechError::Engine("Text is empty after sanitization".to_string()));
        }

        // Amplitude 0-200 (100 normal), pitch 0-99 (50 normal)
        let amplitude = ((self.volume * 200.0).round() as u32).min(200);
        let pitch = ((50.0 + self.pitch * 49.0).round().max(0.0) as u32).min(99);

        debug!("espeak-ng speaking with voice {}", voice);
        let status = Command::new("espeak-ng")
            .arg("-v")
            .arg(&voice)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-a")
            .arg(amplitude.to_string())
            .arg("-p")
            .arg(pitch.to_string())
            .arg(&text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| SpeechError::Engine(format!("Failed to run espeak-ng: {}", e)))?;

        if !status.success() {
            return Err(SpeechError::Engine(format!("espeak-ng exited with {}", status)));
        }
        Ok(())
    }

    fn has_voice(&self, language: Language) -> bool {
        self.available && self.voice_for(language).is_some()
    }

    fn name(&self) -> &str {
        "espeak-ng"
    }
}
