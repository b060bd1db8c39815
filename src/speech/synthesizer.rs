use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::coach::Mood;

/// Prosody and voice parameters for one narration.
#[derive(Debug, Clone)]
pub struct SpeechParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// BCP-47 language tag, e.g. "en-US".
    pub language: String,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
            language: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SynthesisError {
    #[error("speech synthesis failed: {0}")]
    Failed(String),
    #[error("speech synthesis engine unavailable")]
    Unavailable,
}

/// Speech narration provider. `speak` resolves when the utterance has been
/// fully spoken (or failed); `cancel` stops any in-flight utterance
/// immediately and is idempotent.
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str, params: &SpeechParams) -> Result<(), SynthesisError>;

    fn cancel(&self);

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Map a feedback mood onto narration prosody.
pub fn params_for(mood: Mood, language: &str) -> SpeechParams {
    let (rate, pitch) = match mood {
        Mood::Enthusiastic => (1.0, 1.1),
        Mood::Encouraging => (0.95, 1.05),
        Mood::Supportive => (0.9, 1.0),
        Mood::Gentle => (0.85, 0.95),
    };
    SpeechParams {
        rate,
        pitch,
        volume: 1.0,
        language: language.to_string(),
    }
}

/// Serializes access to the narration engine: starting a narration first
/// cancels whatever is currently playing (cancel-then-start, never a queue).
pub struct Narrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl Narrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    pub async fn narrate(
        &self,
        text: &str,
        mood: Mood,
        language: &str,
    ) -> Result<(), SynthesisError> {
        self.synthesizer.cancel();
        self.synthesizer
            .speak(text, &params_for(mood, language))
            .await
    }

    pub fn cancel(&self) {
        self.synthesizer.cancel();
    }
}

/// Default synthesizer for headless runs: logs the narration text and
/// completes immediately.
pub struct ConsoleSynthesizer;

#[async_trait::async_trait]
impl SpeechSynthesizer for ConsoleSynthesizer {
    async fn speak(&self, text: &str, params: &SpeechParams) -> Result<(), SynthesisError> {
        info!(
            "narrating ({}, rate={:.2}): {}",
            params.language, params.rate, text
        );
        Ok(())
    }

    fn cancel(&self) {}

    fn name(&self) -> &str {
        "console"
    }
}
