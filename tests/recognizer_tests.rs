// Tests for the transcription controller: event ordering, last-writer-wins
// session replacement, graceful stop, and single error reporting.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use talkdrill::speech::{
    MockRecognizer, RecognitionConfig, RecognitionError, RecognitionEvent, SpeechRecognizer,
    TranscriptionController,
};

#[tokio::test]
async fn interim_events_precede_the_final_event() {
    // Fuzz the interim count; the final event must always arrive last and
    // interim texts must never shrink within the utterance.
    let mut rng = SmallRng::seed_from_u64(1234);

    for _ in 0..20 {
        let interim_count = rng.gen_range(0..=5);
        let recognizer = MockRecognizer::utterance("the quick brown fox", interim_count, 0.9);

        let mut session = recognizer
            .listen(RecognitionConfig::default())
            .await
            .expect("listen");

        let mut saw_final = false;
        let mut last_interim_len = 0;
        while let Some(event) = session.events.recv().await {
            match event {
                RecognitionEvent::Interim { text } => {
                    assert!(!saw_final, "interim after final");
                    assert!(text.len() >= last_interim_len, "interim text shrank");
                    last_interim_len = text.len();
                }
                RecognitionEvent::Final { text, .. } => {
                    saw_final = true;
                    assert_eq!(text, "the quick brown fox");
                }
                RecognitionEvent::Error(e) => panic!("unexpected error event: {}", e),
            }
        }
        assert!(saw_final);
    }
}

#[tokio::test]
async fn controller_keeps_latest_snapshot() {
    let recognizer = Arc::new(MockRecognizer::utterance("hello there my friend", 3, 0.85));
    let mut controller = TranscriptionController::new(recognizer);

    controller
        .start_listening(RecognitionConfig::default())
        .await
        .expect("start listening");
    controller.stop_listening().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.final_text, "hello there my friend");
    assert!(snapshot.interim_text.is_empty());
    assert!(snapshot.is_final);
    assert!((snapshot.confidence - 0.85).abs() < f32::EPSILON);
}

#[tokio::test]
async fn restart_replaces_the_previous_session() {
    let recognizer = Arc::new(MockRecognizer::utterance("second answer", 1, 0.7));
    let mut controller = TranscriptionController::new(recognizer);

    controller
        .start_listening(RecognitionConfig::default())
        .await
        .expect("first listen");

    // Last-writer-wins: the new session resets the snapshot; the sessions
    // never run concurrently.
    controller
        .start_listening(RecognitionConfig::default())
        .await
        .expect("second listen");
    controller.stop_listening().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.final_text, "second answer");
    assert!(!controller.is_listening());
}

#[tokio::test]
async fn continuous_mode_appends_finals() {
    let recognizer = Arc::new(MockRecognizer::new(vec![
        RecognitionEvent::Final {
            text: "first part".to_string(),
            confidence: 0.9,
        },
        RecognitionEvent::Final {
            text: "second part".to_string(),
            confidence: 0.8,
        },
    ]));
    let mut controller = TranscriptionController::new(recognizer);

    let config = RecognitionConfig {
        continuous: true,
        ..RecognitionConfig::default()
    };
    controller.start_listening(config).await.expect("listen");
    controller.stop_listening().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.final_text, "first part second part");
}

#[tokio::test]
async fn error_is_reported_exactly_once() {
    let recognizer = Arc::new(MockRecognizer::new(vec![RecognitionEvent::Error(
        RecognitionError::NoSpeech,
    )]));
    let mut controller = TranscriptionController::new(recognizer);

    controller
        .start_listening(RecognitionConfig::default())
        .await
        .expect("listen");
    controller.stop_listening().await;

    assert!(matches!(
        controller.take_error(),
        Some(RecognitionError::NoSpeech)
    ));
    assert!(controller.take_error().is_none(), "error reported twice");
}

#[tokio::test]
async fn unsupported_provider_fails_listen() {
    let recognizer = Arc::new(MockRecognizer::failing(RecognitionError::Unsupported));
    let mut controller = TranscriptionController::new(recognizer);

    let result = controller.start_listening(RecognitionConfig::default()).await;
    assert!(matches!(result, Err(RecognitionError::Unsupported)));
    assert!(!controller.is_listening());
}

#[tokio::test]
async fn each_session_reports_its_own_error() {
    let recognizer = Arc::new(MockRecognizer::new(vec![RecognitionEvent::Error(
        RecognitionError::Network("stt offline".to_string()),
    )]));
    let mut controller = TranscriptionController::new(recognizer);

    for _ in 0..2 {
        controller
            .start_listening(RecognitionConfig::default())
            .await
            .expect("listen");
        controller.stop_listening().await;
        assert!(matches!(
            controller.take_error(),
            Some(RecognitionError::Network(_))
        ));
    }
}
