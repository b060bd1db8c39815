// End-to-end tests for the practice session orchestrator, with every
// capability mocked: capture, recognition, narration, and the store.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use talkdrill::audio::{CaptureError, MockCaptureBackend};
use talkdrill::coach::Mood;
use talkdrill::questions::BuiltinBank;
use talkdrill::session::{EntryKind, PracticeSession, SessionConfig, SessionError, SessionPhase};
use talkdrill::speech::{
    MockRecognizer, MockSynthesizer, SpeechRecognizer, SpeechSynthesizer, UnsupportedRecognizer,
};
use talkdrill::store::{
    MemoryStore, ProgressDelta, ProgressRecord, ProgressStore, SessionRecord, StoreError,
};

fn config() -> SessionConfig {
    SessionConfig {
        session_id: "test-session".to_string(),
        user_id: "tester".to_string(),
        ..SessionConfig::default()
    }
}

fn build_session(
    backend: MockCaptureBackend,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn ProgressStore>,
) -> PracticeSession {
    PracticeSession::new(
        config(),
        Box::new(backend),
        recognizer,
        synthesizer,
        Arc::new(BuiltinBank::new()),
        store,
    )
    .expect("session should build")
}

#[tokio::test]
async fn full_turn_produces_feedback_log_and_persistence() {
    let store = Arc::new(MemoryStore::new());
    let synthesizer = Arc::new(MockSynthesizer::new());
    let spoken = synthesizer.spoken_handle();

    let session = build_session(
        MockCaptureBackend::silence(1),
        Arc::new(MockRecognizer::utterance(
            "I really enjoy reading books because they help me relax",
            2,
            0.92,
        )),
        synthesizer,
        Arc::clone(&store) as Arc<dyn ProgressStore>,
    );

    assert_eq!(session.start().await, SessionPhase::Recording);
    let feedback = session.finish_turn().await.expect("a completed turn");

    assert!(feedback.score >= 70);
    assert_eq!(feedback.mood, Mood::Enthusiastic);

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert_eq!(
        snapshot.transcript,
        "I really enjoy reading books because they help me relax"
    );
    assert_eq!(snapshot.attempt_number, 1);

    // Greeting + question announcement + user turn + coach turn.
    let kinds: Vec<EntryKind> = snapshot.message_log.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EntryKind::Bot, EntryKind::Bot, EntryKind::User, EntryKind::Ai]
    );

    // The finalized WAV stays available for playback.
    let recording = session.last_recording().await.expect("a recording");
    assert_eq!(recording.sample_count, 16000);

    // Persistence saw exactly one record, narration spoke the feedback.
    assert_eq!(store.session_count().await, 1);
    let spoken = match spoken.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].starts_with(&feedback.message));
}

#[tokio::test]
async fn missing_recognizer_falls_back_to_placeholder_transcript() {
    let session = build_session(
        MockCaptureBackend::silence(1),
        Arc::new(UnsupportedRecognizer),
        Arc::new(MockSynthesizer::new()),
        Arc::new(MemoryStore::new()),
    );

    session.start().await;
    session.finish_turn().await.expect("turn completes");

    let snapshot = session.snapshot().await;
    assert!(
        snapshot.transcript.starts_with("Audio response ("),
        "transcript was {:?}",
        snapshot.transcript
    );
}

#[tokio::test]
async fn duplicate_start_is_ignored_and_yields_one_result() {
    let session = build_session(
        MockCaptureBackend::silence(1),
        Arc::new(UnsupportedRecognizer),
        Arc::new(MockSynthesizer::new()),
        Arc::new(MemoryStore::new()),
    );

    assert_eq!(session.start().await, SessionPhase::Recording);
    assert_eq!(session.start().await, SessionPhase::Recording);

    assert!(session.finish_turn().await.is_some());
    assert!(session.finish_turn().await.is_none(), "second stop produced a result");
}

#[tokio::test]
async fn new_question_is_rejected_while_recording() {
    let session = build_session(
        MockCaptureBackend::silence(1),
        Arc::new(UnsupportedRecognizer),
        Arc::new(MockSynthesizer::new()),
        Arc::new(MemoryStore::new()),
    );

    session.start().await;
    assert!(matches!(
        session.new_question().await,
        Err(SessionError::Busy(_))
    ));

    session.finish_turn().await.expect("turn completes");
    let question = session.new_question().await.expect("idle again");

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.attempt_number, 0, "attempt counter resets per question");
    assert_eq!(snapshot.question.text, question.text);
}

#[tokio::test]
async fn teardown_mid_recording_releases_the_microphone() {
    let backend = MockCaptureBackend::silence(1);
    let releases = backend.release_count();

    let session = build_session(
        backend,
        Arc::new(UnsupportedRecognizer),
        Arc::new(MockSynthesizer::new()),
        Arc::new(MemoryStore::new()),
    );

    session.start().await;
    session.shutdown().await;

    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert_eq!(session.snapshot().await.phase, SessionPhase::Idle);
}

#[tokio::test]
async fn capture_denial_surfaces_one_error_then_clears() {
    let session = build_session(
        MockCaptureBackend::failing(CaptureError::PermissionDenied),
        Arc::new(UnsupportedRecognizer),
        Arc::new(MockSynthesizer::new()),
        Arc::new(MemoryStore::new()),
    );

    assert_eq!(session.start().await, SessionPhase::Error);

    let snapshot = session.snapshot().await;
    let message = snapshot.error.expect("an error message");
    assert!(message.contains("denied"), "message was {:?}", message);

    // The next user action clears the surfaced error.
    session.new_question().await.expect("error phase is recoverable");
    assert!(session.snapshot().await.error.is_none());
}

#[tokio::test]
async fn clear_session_keeps_the_profile() {
    let session = build_session(
        MockCaptureBackend::silence(1),
        Arc::new(MockRecognizer::utterance("I am from Japan and I like cooking", 1, 0.9)),
        Arc::new(MockSynthesizer::new()),
        Arc::new(MemoryStore::new()),
    );

    session.start().await;
    session.finish_turn().await.expect("turn completes");

    let before = session.snapshot().await;
    assert_eq!(before.profile.country.as_deref(), Some("Japan"));

    session.clear_session().await;

    let after = session.snapshot().await;
    assert_eq!(after.profile.country.as_deref(), Some("Japan"));
    assert!(after.transcript.is_empty());
    assert!(after.feedback.is_none());
    // Log resets to the re-announced question.
    assert_eq!(after.message_log.len(), 1);
    assert_eq!(after.message_log[0].kind, EntryKind::Bot);
}

#[tokio::test]
async fn narration_failure_still_completes_the_turn() {
    let session = build_session(
        MockCaptureBackend::silence(1),
        Arc::new(UnsupportedRecognizer),
        Arc::new(MockSynthesizer::failing()),
        Arc::new(MemoryStore::new()),
    );

    session.start().await;
    assert!(session.finish_turn().await.is_some());
    assert_eq!(session.snapshot().await.phase, SessionPhase::Idle);
}

#[tokio::test]
async fn narration_cancels_before_starting() {
    let synthesizer = Arc::new(MockSynthesizer::new());
    let cancels = synthesizer.cancel_count();

    let session = build_session(
        MockCaptureBackend::silence(1),
        Arc::new(UnsupportedRecognizer),
        synthesizer,
        Arc::new(MemoryStore::new()),
    );

    session.start().await;
    session.finish_turn().await.expect("turn completes");

    // Cancel-then-start policy: the narrator always cancels first.
    assert!(cancels.load(Ordering::SeqCst) >= 1);
}

struct FailingStore;

#[async_trait::async_trait]
impl ProgressStore for FailingStore {
    async fn append_session(&self, _record: &SessionRecord) -> Result<(), StoreError> {
        Err(StoreError::Request("store offline".to_string()))
    }

    async fn apply_progress(&self, _delta: &ProgressDelta) -> Result<ProgressRecord, StoreError> {
        Err(StoreError::Request("store offline".to_string()))
    }

    async fn daily_progress(
        &self,
        _user_id: &str,
        _date: chrono::NaiveDate,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        Err(StoreError::Request("store offline".to_string()))
    }

    async fn recent_sessions(
        &self,
        _user_id: &str,
        _limit: usize,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        Err(StoreError::Request("store offline".to_string()))
    }
}

#[tokio::test]
async fn persistence_failure_never_blocks_the_turn() {
    let session = build_session(
        MockCaptureBackend::silence(1),
        Arc::new(UnsupportedRecognizer),
        Arc::new(MockSynthesizer::new()),
        Arc::new(FailingStore),
    );

    session.start().await;
    let feedback = session.finish_turn().await.expect("turn completes despite store failure");
    assert!(feedback.score >= 20);

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert!(snapshot.error.is_none(), "store failures are non-fatal");
}
