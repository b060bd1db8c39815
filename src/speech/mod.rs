//! Speech capability providers
//!
//! Recognition (speech-to-text) and synthesis (text-to-speech) both sit
//! behind injected traits so the engine never touches a concrete engine
//! directly. The bundled implementations are the NATS STT bridge, a console
//! synthesizer for headless runs, and mocks for tests.

pub mod mock;
pub mod nats;
pub mod recognizer;
pub mod synthesizer;

pub use mock::{MockRecognizer, MockSynthesizer};
pub use nats::{AudioFrameMessage, NatsRecognizer, TranscriptMessage};
pub use recognizer::{
    RecognitionConfig, RecognitionError, RecognitionEvent, RecognitionHandle, RecognitionSession,
    SpeechRecognizer, TranscriptSnapshot, TranscriptionController, UnsupportedRecognizer,
};
pub use synthesizer::{
    params_for, ConsoleSynthesizer, Narrator, SpeechParams, SpeechSynthesizer, SynthesisError,
};
