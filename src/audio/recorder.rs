use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use super::capture::{AudioFrame, CaptureBackend, CaptureConfig, CaptureError};

/// State of one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// A finalized recording: one WAV object plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    /// Complete WAV file bytes (16-bit PCM).
    pub wav_bytes: Vec<u8>,
    /// Whole seconds of recording, from the once-per-second counter.
    pub duration_secs: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_count: usize,
}

/// Manages the lifecycle of one audio capture attempt.
///
/// `idle --start--> recording --stop--> idle` (with result). The controller
/// owns the backend exclusively; whatever exit path is taken (stop, cleanup,
/// drop) the underlying stream is released, and released only once.
pub struct RecordingController {
    config: CaptureConfig,
    backend: Option<Box<dyn CaptureBackend>>,
    state: RecorderState,
    frames: Arc<Mutex<Vec<AudioFrame>>>,
    duration_secs: Arc<AtomicU64>,
    buffer_task: Option<JoinHandle<()>>,
    ticker_task: Option<JoinHandle<()>>,
    stream_open: bool,
}

impl RecordingController {
    pub fn new(backend: Box<dyn CaptureBackend>, config: CaptureConfig) -> Self {
        Self {
            config,
            backend: Some(backend),
            state: RecorderState::Idle,
            frames: Arc::new(Mutex::new(Vec::new())),
            duration_secs: Arc::new(AtomicU64::new(0)),
            buffer_task: None,
            ticker_task: None,
            stream_open: false,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Seconds elapsed in the current attempt. Monotonically non-decreasing
    /// while recording; reset by the next `start()`.
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs.load(Ordering::SeqCst)
    }

    /// Begin a capture attempt. Frames are buffered for finalization and,
    /// when `tap` is given, forwarded live (e.g. to a speech recognizer).
    ///
    /// Starting while already recording is a no-op: the in-flight attempt
    /// keeps running and keeps its eventual stop result.
    pub async fn start(
        &mut self,
        tap: Option<mpsc::Sender<AudioFrame>>,
    ) -> Result<(), CaptureError> {
        if self.is_recording() {
            warn!("recording already started");
            return Ok(());
        }

        let backend = self.backend.as_mut().ok_or(CaptureError::Unavailable)?;
        let mut audio_rx = backend.start().await?;
        self.stream_open = true;
        self.state = RecorderState::Recording;
        self.duration_secs.store(0, Ordering::SeqCst);

        info!("recording started ({})", backend.name());

        {
            let mut frames = self.frames.lock().await;
            frames.clear();
        }

        // Frame buffering: runs until the backend closes its channel on stop.
        let frames = Arc::clone(&self.frames);
        self.buffer_task = Some(tokio::spawn(async move {
            while let Some(frame) = audio_rx.recv().await {
                if let Some(tap) = &tap {
                    // Recognizer may have gone away; recording continues.
                    let _ = tap.try_send(frame.clone());
                }
                let mut frames = frames.lock().await;
                frames.push(frame);
            }
        }));

        // Whole-second duration counter; no sub-second precision needed.
        let duration = Arc::clone(&self.duration_secs);
        self.ticker_task = Some(tokio::spawn(async move {
            let mut ticks = interval(Duration::from_secs(1));
            ticks.tick().await; // first tick completes immediately
            loop {
                ticks.tick().await;
                duration.fetch_add(1, Ordering::SeqCst);
            }
        }));

        Ok(())
    }

    /// Finalize the attempt: release the stream, drain buffered frames into
    /// one WAV object, and return it. Exactly one result per attempt.
    ///
    /// Stopping while idle is a no-op and returns `None`.
    pub async fn stop(&mut self) -> Result<Option<RecordedAudio>, CaptureError> {
        if !self.is_recording() {
            debug!("stop requested while idle; ignoring");
            return Ok(None);
        }

        self.release_stream().await;

        if let Some(task) = self.ticker_task.take() {
            task.abort();
        }
        // The backend closed its channel, so the buffer task drains the
        // remaining frames and exits on its own.
        if let Some(task) = self.buffer_task.take() {
            if let Err(e) = task.await {
                warn!("frame buffer task failed: {}", e);
            }
        }

        let frames: Vec<AudioFrame> = {
            let mut guard = self.frames.lock().await;
            std::mem::take(&mut *guard)
        };

        let duration_secs = self.duration_secs.load(Ordering::SeqCst);
        let sample_rate = frames
            .first()
            .map(|f| f.sample_rate)
            .unwrap_or(self.config.sample_rate);
        let channels = frames
            .first()
            .map(|f| f.channels)
            .unwrap_or(self.config.channels);
        let sample_count = frames.iter().map(|f| f.samples.len()).sum();

        let wav_bytes = encode_wav(&frames, sample_rate, channels)?;
        self.state = RecorderState::Idle;

        info!(
            "recording stopped: {}s, {} samples, {} bytes",
            duration_secs,
            sample_count,
            wav_bytes.len()
        );

        Ok(Some(RecordedAudio {
            wav_bytes,
            duration_secs,
            sample_rate,
            channels,
            sample_count,
        }))
    }

    /// Scoped-resource release: cancel the worker tasks and release the
    /// stream if it is still open. Safe to call on any exit path and
    /// idempotent - calling it while idle is a no-op.
    pub async fn cleanup(&mut self) {
        if let Some(task) = self.ticker_task.take() {
            task.abort();
        }
        if let Some(task) = self.buffer_task.take() {
            task.abort();
        }
        self.release_stream().await;
        {
            let mut frames = self.frames.lock().await;
            frames.clear();
        }
        self.state = RecorderState::Idle;
    }

    async fn release_stream(&mut self) {
        if !self.stream_open {
            return;
        }
        self.stream_open = false;
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.stop().await {
                warn!("failed to release capture stream: {}", e);
            }
        }
    }
}

impl Drop for RecordingController {
    fn drop(&mut self) {
        if !self.stream_open {
            return;
        }
        // Last-resort release for a controller discarded mid-recording. The
        // normal paths (stop, cleanup) release synchronously before this.
        if let Some(mut backend) = self.backend.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        let _ = backend.stop().await;
                    });
                }
                Err(_) => {
                    warn!("recording controller dropped outside a runtime; stream not released");
                }
            }
        }
    }
}

/// Encode buffered frames into a single in-memory WAV file.
fn encode_wav(
    frames: &[AudioFrame],
    sample_rate: u32,
    channels: u16,
) -> Result<Vec<u8>, CaptureError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| CaptureError::Backend(format!("WAV writer: {}", e)))?;
        for frame in frames {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| CaptureError::Backend(format!("WAV write: {}", e)))?;
            }
        }
        writer
            .finalize()
            .map_err(|e| CaptureError::Backend(format!("WAV finalize: {}", e)))?;
    }

    Ok(cursor.into_inner())
}
