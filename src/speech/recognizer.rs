use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audio::AudioFrame;

/// Options for one listening session.
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// BCP-47 language tag, e.g. "en-US".
    pub language: String,
    /// Keep listening across utterances, emitting a final event per utterance.
    pub continuous: bool,
    /// Deliver interim (unstable) results while an utterance is in flight.
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: false,
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

/// Failure modes a recognition provider can surface. Each is reported at
/// most once per session, after which the session is over.
#[derive(Debug, Clone, Error)]
pub enum RecognitionError {
    #[error("speech recognition is not available")]
    Unsupported,
    #[error("no speech detected")]
    NoSpeech,
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("recognition network failure: {0}")]
    Network(String),
    #[error("recognition aborted")]
    Aborted,
}

/// Events delivered while listening.
///
/// Interim events for an utterance always precede that utterance's final
/// event; the final event is the last event for the utterance.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    Interim { text: String },
    Final { text: String, confidence: f32 },
    Error(RecognitionError),
}

/// Cloneable stop signal for a listening session. Stopping is graceful: an
/// in-flight utterance still emits its terminal event.
#[derive(Clone)]
pub struct RecognitionHandle {
    stop_tx: mpsc::Sender<()>,
}

impl RecognitionHandle {
    pub fn channel() -> (Self, mpsc::Receiver<()>) {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        (Self { stop_tx }, stop_rx)
    }

    pub fn request_stop(&self) {
        let _ = self.stop_tx.try_send(());
    }
}

/// One active listening session, as returned by a provider.
pub struct RecognitionSession {
    pub events: mpsc::Receiver<RecognitionEvent>,
    pub control: RecognitionHandle,
    /// Where the provider wants live audio frames, if it consumes them.
    /// Providers driven by an external audio path (e.g. an OS speech
    /// service) leave this empty.
    pub frames: Option<mpsc::Sender<AudioFrame>>,
}

/// Speech recognition provider.
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Open a listening session.
    async fn listen(&self, config: RecognitionConfig)
        -> Result<RecognitionSession, RecognitionError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Stand-in for platforms without a recognition capability; `listen` always
/// fails with [`RecognitionError::Unsupported`].
pub struct UnsupportedRecognizer;

#[async_trait::async_trait]
impl SpeechRecognizer for UnsupportedRecognizer {
    async fn listen(
        &self,
        _config: RecognitionConfig,
    ) -> Result<RecognitionSession, RecognitionError> {
        Err(RecognitionError::Unsupported)
    }

    fn name(&self) -> &str {
        "unsupported"
    }
}

/// Latest transcription state. The controller keeps only this snapshot, not
/// the full event stream.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranscriptSnapshot {
    pub final_text: String,
    pub interim_text: String,
    pub confidence: f32,
    pub is_final: bool,
}

struct ActiveListen {
    control: RecognitionHandle,
    pump: JoinHandle<()>,
}

/// Manages one speech-to-text attempt at a time.
///
/// `idle --listen--> listening --(final result | error | stop)--> idle`.
/// Starting while already listening stops the prior session first
/// (last-writer-wins); two sessions never run concurrently.
pub struct TranscriptionController {
    recognizer: Arc<dyn SpeechRecognizer>,
    snapshot: Arc<Mutex<TranscriptSnapshot>>,
    last_error: Arc<Mutex<Option<RecognitionError>>>,
    active: Option<ActiveListen>,
}

impl TranscriptionController {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            recognizer,
            snapshot: Arc::new(Mutex::new(TranscriptSnapshot::default())),
            last_error: Arc::new(Mutex::new(None)),
            active: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| !a.pump.is_finished())
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        lock(&self.snapshot).clone()
    }

    /// The session's error, if one was reported. Reading it clears it.
    pub fn take_error(&mut self) -> Option<RecognitionError> {
        lock(&self.last_error).take()
    }

    /// Begin listening. Returns the provider's frame sink when it consumes
    /// live audio, so the caller can tap the capture stream into it.
    pub async fn start_listening(
        &mut self,
        config: RecognitionConfig,
    ) -> Result<Option<mpsc::Sender<AudioFrame>>, RecognitionError> {
        if self.active.is_some() {
            debug!("listen requested while already listening; replacing session");
            self.stop_listening().await;
        }

        *lock(&self.snapshot) = TranscriptSnapshot::default();
        *lock(&self.last_error) = None;

        let session = self.recognizer.listen(config.clone()).await?;
        let RecognitionSession {
            events,
            control,
            frames,
        } = session;

        info!(
            "listening started ({}, language={}, continuous={})",
            self.recognizer.name(),
            config.language,
            config.continuous
        );

        let snapshot = Arc::clone(&self.snapshot);
        let last_error = Arc::clone(&self.last_error);
        let continuous = config.continuous;
        let pump = tokio::spawn(async move {
            pump_events(events, snapshot, last_error, continuous).await;
        });

        self.active = Some(ActiveListen { control, pump });
        Ok(frames)
    }

    /// Graceful termination: the in-flight utterance, if any, still emits
    /// its terminal event before the controller returns to idle.
    pub async fn stop_listening(&mut self) {
        if let Some(active) = self.active.take() {
            active.control.request_stop();
            if let Err(e) = active.pump.await {
                if !e.is_cancelled() {
                    warn!("transcription pump failed: {}", e);
                }
            }
        }
    }

    /// Hard cancellation for teardown paths; pending events are discarded.
    pub fn abort(&mut self) {
        if let Some(active) = self.active.take() {
            active.control.request_stop();
            active.pump.abort();
        }
    }
}

impl Drop for TranscriptionController {
    fn drop(&mut self) {
        self.abort();
    }
}

async fn pump_events(
    mut events: mpsc::Receiver<RecognitionEvent>,
    snapshot: Arc<Mutex<TranscriptSnapshot>>,
    last_error: Arc<Mutex<Option<RecognitionError>>>,
    continuous: bool,
) {
    while let Some(event) = events.recv().await {
        match event {
            RecognitionEvent::Interim { text } => {
                let mut snap = lock(&snapshot);
                snap.interim_text = text;
                snap.is_final = false;
            }
            RecognitionEvent::Final { text, confidence } => {
                let mut snap = lock(&snapshot);
                if continuous && !snap.final_text.is_empty() {
                    snap.final_text.push(' ');
                    snap.final_text.push_str(&text);
                } else {
                    snap.final_text = text;
                }
                snap.interim_text.clear();
                snap.confidence = confidence;
                snap.is_final = true;
                if !continuous {
                    break;
                }
            }
            RecognitionEvent::Error(e) => {
                warn!("recognition error: {}", e);
                *lock(&last_error) = Some(e);
                break;
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
