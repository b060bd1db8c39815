use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::audio::{AudioFrame, PushCaptureBackend};
use crate::coach::FeedbackResponse;
use crate::questions::{Level, Question};
use crate::session::{PracticeSession, SessionConfig, SessionPhase};
use crate::store::{ProgressRecord, SessionRecord};

use super::state::{AppState, SessionEntry};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Optional session ID (if not provided, generate one)
    pub session_id: Option<String>,

    /// Owner of the persisted progress records (default: "local")
    pub user_id: Option<String>,

    /// Difficulty level (default: beginner)
    pub level: Option<Level>,

    /// BCP-47 language tag (default: "en-US")
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub question: Question,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PhaseResponse {
    pub session_id: String,
    pub phase: SessionPhase,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub session_id: String,
    pub feedback: FeedbackResponse,
}

/// One PCM frame pushed by the capturing client.
#[derive(Debug, Deserialize)]
pub struct AudioPushRequest {
    /// Base64-encoded 16-bit little-endian PCM
    pub pcm: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub timestamp_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct AudioPushResponse {
    pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    /// Day to report on (default: today)
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub user_id: String,
    pub date: NaiveDate,
    pub progress: Option<ProgressRecord>,
    pub recent_sessions: Vec<SessionRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found(session_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session {} not found", session_id),
        }),
    )
        .into_response()
}

async fn entry(state: &AppState, session_id: &str) -> Option<SessionEntry> {
    let sessions = state.sessions.read().await;
    sessions.get(session_id).cloned()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Create a new practice session and draw its first question
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("practice-{}", uuid::Uuid::new_v4()));

    info!("Creating practice session: {}", session_id);

    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&session_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Session {} already exists", session_id),
                }),
            )
                .into_response();
        }
    }

    let config = SessionConfig {
        session_id: session_id.clone(),
        user_id: req.user_id.unwrap_or_else(|| "local".to_string()),
        level: req.level.unwrap_or(Level::Beginner),
        language: req.language.unwrap_or_else(|| "en-US".to_string()),
        ..SessionConfig::default()
    };

    let (capture, audio_in) = PushCaptureBackend::new();
    let session = match PracticeSession::new(
        config,
        Box::new(capture),
        Arc::clone(&state.recognizer),
        Arc::clone(&state.synthesizer),
        Arc::clone(&state.bank),
        Arc::clone(&state.store),
    ) {
        Ok(session) => Arc::new(session),
        Err(e) => {
            error!("Failed to create session: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to create session: {}", e),
                }),
            )
                .into_response();
        }
    };

    let snapshot = session.snapshot().await;

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), SessionEntry { session, audio_in });
    }

    (
        StatusCode::OK,
        Json(CreateSessionResponse {
            session_id: session_id.clone(),
            question: snapshot.question,
            message: format!("Practice session {} created", session_id),
        }),
    )
        .into_response()
}

/// POST /sessions/:session_id/record/start
/// Begin a recording turn
pub async fn start_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match entry(&state, &session_id).await {
        Some(entry) => {
            let phase = entry.session.start().await;
            (
                StatusCode::OK,
                Json(PhaseResponse { session_id, phase }),
            )
                .into_response()
        }
        None => not_found(&session_id),
    }
}

/// POST /sessions/:session_id/audio
/// Push one PCM frame into the active recording
pub async fn push_audio(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<AudioPushRequest>,
) -> impl IntoResponse {
    let Some(entry) = entry(&state, &session_id).await else {
        return not_found(&session_id);
    };

    let pcm_bytes = match base64::engine::general_purpose::STANDARD.decode(&req.pcm) {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid base64 PCM payload: {}", e),
                }),
            )
                .into_response();
        }
    };
    if pcm_bytes.len() % 2 != 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "PCM payload must contain whole 16-bit samples".to_string(),
            }),
        )
            .into_response();
    }

    let samples: Vec<i16> = pcm_bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let accepted = entry.audio_in.push(AudioFrame {
        samples,
        sample_rate: req.sample_rate,
        channels: req.channels,
        timestamp_ms: req.timestamp_ms,
    });

    (StatusCode::OK, Json(AudioPushResponse { accepted })).into_response()
}

/// POST /sessions/:session_id/record/stop
/// Finish the turn: transcript, feedback, narration
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = entry(&state, &session_id).await else {
        return not_found(&session_id);
    };

    match entry.session.finish_turn().await {
        Some(feedback) => (
            StatusCode::OK,
            Json(TurnResponse {
                session_id,
                feedback,
            }),
        )
            .into_response(),
        None => {
            // Either nothing was recording, or the turn failed; the snapshot
            // carries the error message in the latter case.
            let snapshot = entry.session.snapshot().await;
            match snapshot.error {
                Some(message) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { error: message }),
                )
                    .into_response(),
                None => (
                    StatusCode::CONFLICT,
                    Json(ErrorResponse {
                        error: "No recording in flight".to_string(),
                    }),
                )
                    .into_response(),
            }
        }
    }
}

/// POST /sessions/:session_id/question
/// Draw the next question
pub async fn next_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = entry(&state, &session_id).await else {
        return not_found(&session_id);
    };

    match entry.session.new_question().await {
        Ok(question) => (StatusCode::OK, Json(question)).into_response(),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /sessions/:session_id/clear
/// Reset the conversation (profile persists)
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match entry(&state, &session_id).await {
        Some(entry) => {
            entry.session.clear_session().await;
            let phase = entry.session.snapshot().await.phase;
            (StatusCode::OK, Json(PhaseResponse { session_id, phase })).into_response()
        }
        None => not_found(&session_id),
    }
}

/// DELETE /sessions/:session_id
/// Tear the session down, releasing any captured resources
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let removed = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match removed {
        Some(entry) => {
            entry.session.shutdown().await;
            info!("Session {} deleted", session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(&session_id),
    }
}

/// GET /sessions/:session_id/snapshot
/// Read-only view of the session
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match entry(&state, &session_id).await {
        Some(entry) => (StatusCode::OK, Json(entry.session.snapshot().await)).into_response(),
        None => not_found(&session_id),
    }
}

/// GET /sessions/:session_id/recording
/// WAV audio of the most recent turn
pub async fn get_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = entry(&state, &session_id).await else {
        return not_found(&session_id);
    };

    match entry.session.last_recording().await {
        Some(recording) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "audio/wav")],
            recording.wav_bytes,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No completed recording for this session".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /sessions/:session_id/log
/// Conversation log (accumulated so far)
pub async fn get_log(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match entry(&state, &session_id).await {
        Some(entry) => {
            let snapshot = entry.session.snapshot().await;
            (StatusCode::OK, Json(snapshot.message_log)).into_response()
        }
        None => not_found(&session_id),
    }
}

/// GET /users/:user_id/progress
/// Daily progress plus recent session records
pub async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ProgressQuery>,
) -> impl IntoResponse {
    let date = query.date.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let progress = match state.store.daily_progress(&user_id, date).await {
        Ok(progress) => progress,
        Err(e) => {
            error!("Failed to read progress: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to read progress: {}", e),
                }),
            )
                .into_response();
        }
    };

    let recent_sessions = match state.store.recent_sessions(&user_id, 10).await {
        Ok(sessions) => sessions,
        Err(e) => {
            error!("Failed to read recent sessions: {}", e);
            Vec::new()
        }
    };

    (
        StatusCode::OK,
        Json(ProgressResponse {
            user_id,
            date,
            progress,
            recent_sessions,
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
