use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::debug;

use super::capture::{AudioFrame, CaptureBackend, CaptureError};

const PUSH_CHANNEL_CAPACITY: usize = 256;

/// Capture backend fed by an external client.
///
/// The recording device lives on the other side of the HTTP surface (a
/// browser or mobile client); it POSTs PCM frames which the handler forwards
/// through the [`PushHandle`]. Frames pushed while no recording is active are
/// dropped.
pub struct PushCaptureBackend {
    slot: Arc<Mutex<Option<mpsc::Sender<AudioFrame>>>>,
    capturing: bool,
}

/// Cloneable writer half of a [`PushCaptureBackend`].
#[derive(Clone)]
pub struct PushHandle {
    slot: Arc<Mutex<Option<mpsc::Sender<AudioFrame>>>>,
}

impl PushCaptureBackend {
    pub fn new() -> (Self, PushHandle) {
        let slot = Arc::new(Mutex::new(None));
        (
            Self {
                slot: Arc::clone(&slot),
                capturing: false,
            },
            PushHandle { slot },
        )
    }
}

impl PushHandle {
    /// Forward one frame into the active recording, if any.
    ///
    /// Returns whether the frame was accepted. A full buffer drops the frame
    /// rather than blocking the HTTP handler.
    pub fn push(&self, frame: AudioFrame) -> bool {
        let slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match slot.as_ref() {
            Some(tx) => match tx.try_send(frame) {
                Ok(()) => true,
                Err(e) => {
                    debug!("dropping pushed audio frame: {}", e);
                    false
                }
            },
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for PushCaptureBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        let (tx, rx) = mpsc::channel(PUSH_CHANNEL_CAPACITY);
        {
            let mut slot = match self.slot.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *slot = Some(tx);
        }
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if self.capturing {
            self.capturing = false;
            let mut slot = match self.slot.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *slot = None; // closes the channel
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "push"
    }
}
