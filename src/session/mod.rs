//! Practice session orchestration
//!
//! This module provides the `PracticeSession` abstraction that manages:
//! - The recording and transcription controllers for each turn
//! - Feedback generation and narration
//! - The append-only conversation log and read-only snapshot
//! - Best-effort persistence of session and progress records

mod config;
mod orchestrator;
mod state;

pub use config::SessionConfig;
pub use orchestrator::{PracticeSession, SessionError};
pub use state::{EntryKind, MessageLogEntry, SessionPhase, SessionSnapshot};
