use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::recognizer::{
    RecognitionConfig, RecognitionError, RecognitionEvent, RecognitionHandle, RecognitionSession,
    SpeechRecognizer,
};
use super::synthesizer::{SpeechParams, SpeechSynthesizer, SynthesisError};

/// Scripted recognizer for tests: every `listen` replays the same event
/// sequence, then ends the session.
pub struct MockRecognizer {
    events: Vec<RecognitionEvent>,
    fail_listen: Option<RecognitionError>,
}

impl MockRecognizer {
    pub fn new(events: Vec<RecognitionEvent>) -> Self {
        Self {
            events,
            fail_listen: None,
        }
    }

    /// A recognizer that emits `interim_count` growing interim events
    /// followed by one final event.
    pub fn utterance(text: &str, interim_count: usize, confidence: f32) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut events = Vec::new();
        for i in 0..interim_count {
            // Interim texts grow toward the final text, never shrink.
            let upto = ((i + 1) * words.len()).div_ceil(interim_count.max(1)).min(words.len());
            events.push(RecognitionEvent::Interim {
                text: words[..upto].join(" "),
            });
        }
        events.push(RecognitionEvent::Final {
            text: text.to_string(),
            confidence,
        });
        Self::new(events)
    }

    /// A recognizer whose `listen` fails with the given error.
    pub fn failing(error: RecognitionError) -> Self {
        Self {
            events: Vec::new(),
            fail_listen: Some(error),
        }
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn listen(
        &self,
        _config: RecognitionConfig,
    ) -> Result<RecognitionSession, RecognitionError> {
        if let Some(error) = self.fail_listen.clone() {
            return Err(error);
        }

        let (event_tx, events) = mpsc::channel(self.events.len().max(1) + 1);
        for event in &self.events {
            // Capacity covers every scripted event.
            let _ = event_tx.try_send(event.clone());
        }
        // Dropping the sender ends the session after the script drains.
        let (control, _stop_rx) = RecognitionHandle::channel();
        Ok(RecognitionSession {
            events,
            control,
            frames: None,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Recording synthesizer for tests: remembers what it was asked to speak and
/// how often it was cancelled.
#[derive(Default)]
pub struct MockSynthesizer {
    spoken: Arc<Mutex<Vec<String>>>,
    cancel_count: Arc<AtomicUsize>,
    fail: bool,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        match self.spoken.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn spoken_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.spoken)
    }

    pub fn cancel_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.cancel_count)
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn speak(&self, text: &str, _params: &SpeechParams) -> Result<(), SynthesisError> {
        if self.fail {
            return Err(SynthesisError::Failed("mock failure".to_string()));
        }
        let mut spoken = match self.spoken.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        spoken.push(text.to_string());
        Ok(())
    }

    fn cancel(&self) {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "mock"
    }
}
