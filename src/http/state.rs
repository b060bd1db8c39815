use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::audio::PushHandle;
use crate::questions::QuestionBank;
use crate::session::PracticeSession;
use crate::speech::{SpeechRecognizer, SpeechSynthesizer};
use crate::store::ProgressStore;

/// One registered session plus the writer half of its audio path.
#[derive(Clone)]
pub struct SessionEntry {
    pub session: Arc<PracticeSession>,
    pub audio_in: PushHandle,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active practice sessions (session_id → entry)
    pub sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,

    // Capability providers injected into every new session.
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub bank: Arc<dyn QuestionBank>,
    pub store: Arc<dyn ProgressStore>,
}

impl AppState {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        bank: Arc<dyn QuestionBank>,
        store: Arc<dyn ProgressStore>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            recognizer,
            synthesizer,
            bank,
            store,
        }
    }
}
