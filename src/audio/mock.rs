use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::capture::{AudioFrame, CaptureBackend, CaptureError};

/// Scripted capture backend for tests.
///
/// Delivers its configured frames immediately on `start()` and keeps the
/// channel open until `stop()`, mimicking a live microphone that has gone
/// quiet. `release_count` tracks how many times the underlying stream was
/// actually released, which lets tests assert exactly-once cleanup.
pub struct MockCaptureBackend {
    frames: Vec<AudioFrame>,
    fail_start: Option<CaptureError>,
    capturing: bool,
    frame_tx: Option<mpsc::Sender<AudioFrame>>,
    release_count: Arc<AtomicUsize>,
}

impl MockCaptureBackend {
    pub fn new(frames: Vec<AudioFrame>) -> Self {
        Self {
            frames,
            fail_start: None,
            capturing: false,
            frame_tx: None,
            release_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A backend producing `seconds` one-second frames of silence at 16kHz mono.
    pub fn silence(seconds: u64) -> Self {
        let frames = (0..seconds)
            .map(|i| AudioFrame {
                samples: vec![0i16; 16000],
                sample_rate: 16000,
                channels: 1,
                timestamp_ms: i * 1000,
            })
            .collect();
        Self::new(frames)
    }

    /// A backend whose `start()` fails with the given error.
    pub fn failing(error: CaptureError) -> Self {
        let mut backend = Self::new(Vec::new());
        backend.fail_start = Some(error);
        backend
    }

    /// Handle for asserting how many times the stream was released.
    pub fn release_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.release_count)
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MockCaptureBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if let Some(error) = self.fail_start.clone() {
            return Err(error);
        }

        let (tx, rx) = mpsc::channel(self.frames.len().max(1) + 1);
        for frame in &self.frames {
            // Capacity covers every scripted frame, so this cannot fail.
            let _ = tx.try_send(frame.clone());
        }
        self.frame_tx = Some(tx);
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if self.capturing {
            self.capturing = false;
            self.frame_tx = None; // closes the channel
            self.release_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "mock"
    }
}
