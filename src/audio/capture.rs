use thiserror::Error;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (will resample if needed)
    pub sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz, what the STT bridge expects
            channels: 1,        // Mono
            buffer_duration_ms: 100,
        }
    }
}

/// Failure modes a capture provider can surface.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("microphone access denied")]
    PermissionDenied,
    #[error("no audio capture capability available")]
    Unavailable,
    #[error("capture backend failure: {0}")]
    Backend(String),
}

/// Audio capture provider
///
/// Implementations are injected into the recording controller so tests can
/// substitute mocks and multiple sessions can run side by side:
/// - Push: frames arrive from a remote client over the HTTP surface
/// - Mock: scripted frames for tests
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Stop capturing and release the underlying stream. Idempotent.
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
