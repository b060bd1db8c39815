pub mod capture;
pub mod mock;
pub mod push;
pub mod recorder;

pub use capture::{AudioFrame, CaptureBackend, CaptureConfig, CaptureError};
pub use mock::MockCaptureBackend;
pub use push::{PushCaptureBackend, PushHandle};
pub use recorder::{RecordedAudio, RecorderState, RecordingController};
