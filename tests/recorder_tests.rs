// Tests for the recording controller's lifecycle: start/stop pairing, WAV
// finalization, and exactly-once stream release on every exit path.

use std::sync::atomic::Ordering;

use talkdrill::audio::{
    CaptureConfig, CaptureError, MockCaptureBackend, RecorderState, RecordingController,
};

fn controller_with(backend: MockCaptureBackend) -> RecordingController {
    RecordingController::new(Box::new(backend), CaptureConfig::default())
}

#[tokio::test]
async fn stop_without_start_is_a_noop() {
    let mut controller = controller_with(MockCaptureBackend::silence(1));

    let result = controller.stop().await.expect("stop should not fail");
    assert!(result.is_none());
    assert_eq!(controller.state(), RecorderState::Idle);
}

#[tokio::test]
async fn records_and_finalizes_one_wav_object() {
    let mut controller = controller_with(MockCaptureBackend::silence(2));

    controller.start(None).await.expect("start");
    assert_eq!(controller.state(), RecorderState::Recording);

    let recorded = controller
        .stop()
        .await
        .expect("stop")
        .expect("a finalized recording");

    // Two seconds of 16kHz mono silence.
    assert_eq!(recorded.sample_count, 32000);
    assert_eq!(recorded.sample_rate, 16000);
    assert_eq!(recorded.channels, 1);
    // A WAV header plus 16-bit samples.
    assert!(recorded.wav_bytes.len() > 44);
    assert_eq!(controller.state(), RecorderState::Idle);
}

#[tokio::test]
async fn stop_releases_the_stream_exactly_once() {
    let backend = MockCaptureBackend::silence(1);
    let releases = backend.release_count();
    let mut controller = controller_with(backend);

    controller.start(None).await.expect("start");
    controller.stop().await.expect("stop");
    assert_eq!(releases.load(Ordering::SeqCst), 1);

    // A later cleanup must not release again.
    controller.cleanup().await;
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cleanup_is_idempotent() {
    let backend = MockCaptureBackend::silence(1);
    let releases = backend.release_count();
    let mut controller = controller_with(backend);

    controller.start(None).await.expect("start");
    controller.cleanup().await;
    controller.cleanup().await;
    controller.cleanup().await;

    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), RecorderState::Idle);
}

#[tokio::test]
async fn cleanup_while_idle_is_a_noop() {
    let backend = MockCaptureBackend::silence(1);
    let releases = backend.release_count();
    let mut controller = controller_with(backend);

    controller.cleanup().await;
    assert_eq!(releases.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_start_keeps_one_attempt() {
    let mut controller = controller_with(MockCaptureBackend::silence(1));

    controller.start(None).await.expect("first start");
    controller.start(None).await.expect("second start is ignored");

    // Exactly one stop result for the pair of starts.
    let first = controller.stop().await.expect("stop");
    assert!(first.is_some());
    let second = controller.stop().await.expect("second stop");
    assert!(second.is_none());
}

#[tokio::test]
async fn permission_denied_surfaces_as_capture_error() {
    let mut controller =
        controller_with(MockCaptureBackend::failing(CaptureError::PermissionDenied));

    let result = controller.start(None).await;
    assert!(matches!(result, Err(CaptureError::PermissionDenied)));
    assert_eq!(controller.state(), RecorderState::Idle);
}

#[tokio::test]
async fn tap_receives_captured_frames() {
    let mut controller = controller_with(MockCaptureBackend::silence(2));
    let (tap_tx, mut tap_rx) = tokio::sync::mpsc::channel(8);

    controller.start(Some(tap_tx)).await.expect("start");
    controller.stop().await.expect("stop");

    let mut forwarded = 0;
    while tap_rx.try_recv().is_ok() {
        forwarded += 1;
    }
    assert_eq!(forwarded, 2);
}
