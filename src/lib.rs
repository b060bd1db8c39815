pub mod audio;
pub mod coach;
pub mod config;
pub mod http;
pub mod questions;
pub mod session;
pub mod speech;
pub mod store;

pub use audio::{
    AudioFrame, CaptureBackend, CaptureConfig, CaptureError, MockCaptureBackend,
    PushCaptureBackend, PushHandle, RecordedAudio, RecordingController,
};
pub use coach::{FeedbackResponse, Mood, ResponseGenerator, TopicBranch, TurnHistory, UserProfile};
pub use config::Config;
pub use http::{create_router, AppState};
pub use questions::{BuiltinBank, Level, Question, QuestionBank};
pub use session::{
    MessageLogEntry, PracticeSession, SessionConfig, SessionError, SessionPhase, SessionSnapshot,
};
pub use speech::{
    ConsoleSynthesizer, NatsRecognizer, Narrator, RecognitionConfig, RecognitionError,
    RecognitionEvent, SpeechRecognizer, SpeechSynthesizer, TranscriptionController,
    UnsupportedRecognizer,
};
pub use store::{MemoryStore, ProgressRecord, ProgressStore, RestStore, SessionRecord};
