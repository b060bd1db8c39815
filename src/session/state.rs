use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::coach::{FeedbackResponse, UserProfile};
use crate::questions::Question;

/// Phase of the practice loop. Cyclical:
/// Idle -> Recording -> Processing -> Speaking -> Idle, with Error reachable
/// from any phase on a controller failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Recording,
    Processing,
    Speaking,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Bot,
    User,
    Ai,
    System,
}

/// One entry in the append-only conversation log.
#[derive(Debug, Clone, Serialize)]
pub struct MessageLogEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackResponse>,
}

impl MessageLogEntry {
    fn base(kind: EntryKind, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content,
            timestamp: Utc::now(),
            duration_secs: None,
            confidence: None,
            feedback: None,
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::base(EntryKind::Bot, content.into())
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::base(EntryKind::System, content.into())
    }

    pub fn user(content: impl Into<String>, duration_secs: u64, confidence: Option<f32>) -> Self {
        let mut entry = Self::base(EntryKind::User, content.into());
        entry.duration_secs = Some(duration_secs);
        entry.confidence = confidence;
        entry
    }

    pub fn ai(feedback: &FeedbackResponse) -> Self {
        let mut entry = Self::base(EntryKind::Ai, feedback.message.clone());
        entry.feedback = Some(feedback.clone());
        entry
    }
}

/// Read-only view of the session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: SessionPhase,
    pub question: Question,
    pub attempt_number: u32,
    pub transcript: String,
    pub interim_transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackResponse>,
    pub message_log: Vec<MessageLogEntry>,
    pub profile: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
