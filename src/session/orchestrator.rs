use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::audio::{CaptureBackend, CaptureConfig, RecordedAudio, RecordingController};
use crate::coach::{FeedbackResponse, ResponseGenerator, Turn, TurnHistory, UserProfile};
use crate::questions::{Question, QuestionBank};
use crate::speech::{
    Narrator, RecognitionConfig, SpeechRecognizer, SpeechSynthesizer, TranscriptionController,
};
use crate::store::{ProgressDelta, ProgressStore, SessionRecord};

use super::config::SessionConfig;
use super::state::{MessageLogEntry, SessionPhase, SessionSnapshot};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot draw a new question while {0} is in flight")]
    Busy(&'static str),
}

struct Inner {
    phase: SessionPhase,
    recorder: RecordingController,
    transcriber: TranscriptionController,
    generator: ResponseGenerator,
    profile: UserProfile,
    history: TurnHistory,
    question: Question,
    attempt: u32,
    transcript: String,
    feedback: Option<FeedbackResponse>,
    last_recording: Option<RecordedAudio>,
    log: Vec<MessageLogEntry>,
    error: Option<String>,
}

/// One learner's practice session.
///
/// Sequences the recording and transcription controllers, the feedback
/// engine, and narration, and exposes a read-only snapshot to the
/// presentation layer. All capabilities are injected, so sessions can run
/// side by side and tests can substitute mocks.
pub struct PracticeSession {
    config: SessionConfig,
    bank: Arc<dyn QuestionBank>,
    store: Arc<dyn ProgressStore>,
    narrator: Narrator,
    inner: Mutex<Inner>,
}

impl PracticeSession {
    pub fn new(
        config: SessionConfig,
        capture: Box<dyn CaptureBackend>,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        bank: Arc<dyn QuestionBank>,
        store: Arc<dyn ProgressStore>,
    ) -> Result<Self> {
        let generator = ResponseGenerator::new(config.perturbation_seed)
            .context("building response generator")?;

        let question = bank.next_question(config.level);
        let log = vec![
            MessageLogEntry::bot(
                "Hi! I'm your speaking coach. Answer out loud and I'll give you feedback.",
            ),
            MessageLogEntry::bot(question.text.clone()),
        ];

        info!("Creating practice session: {}", config.session_id);

        Ok(Self {
            narrator: Narrator::new(synthesizer),
            inner: Mutex::new(Inner {
                phase: SessionPhase::Idle,
                recorder: RecordingController::new(capture, CaptureConfig::default()),
                transcriber: TranscriptionController::new(recognizer),
                generator,
                profile: UserProfile::default(),
                history: TurnHistory::default(),
                question,
                attempt: 0,
                transcript: String::new(),
                feedback: None,
                last_recording: None,
                log,
                error: None,
            }),
            config,
            bank,
            store,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    /// Begin a recording turn. Ignored unless the session is idle (or
    /// recovering from an error): a start while a turn is in flight changes
    /// nothing and produces no extra stop result.
    pub async fn start(&self) -> SessionPhase {
        let mut inner = self.inner.lock().await;
        match inner.phase {
            SessionPhase::Idle | SessionPhase::Error => {}
            phase => {
                debug!("start ignored in phase {:?}", phase);
                return phase;
            }
        }
        inner.error = None;

        // Recognition first, so its frame sink can tap the capture stream.
        // A missing or failing recognizer is not fatal: the turn falls back
        // to a placeholder transcript.
        let recognition = RecognitionConfig {
            language: self.config.language.clone(),
            continuous: false,
            interim_results: self.config.interim_results,
            max_alternatives: 1,
        };
        let tap = match inner.transcriber.start_listening(recognition).await {
            Ok(tap) => tap,
            Err(e) => {
                debug!("recognition unavailable for this turn: {}", e);
                None
            }
        };

        if let Err(e) = inner.recorder.start(tap).await {
            inner.transcriber.abort();
            Self::fail(&mut inner, format!("Could not start recording: {}", e));
            return inner.phase;
        }

        inner.phase = SessionPhase::Recording;
        inner.phase
    }

    /// Finish the current turn: stop capture, take the best transcript
    /// available, score it, log both sides of the exchange, persist
    /// best-effort, and narrate the feedback.
    ///
    /// Returns `None` when no recording was in flight.
    pub async fn finish_turn(&self) -> Option<FeedbackResponse> {
        let mut inner = self.inner.lock().await;
        if inner.phase != SessionPhase::Recording {
            debug!("stop requested while not recording; ignoring");
            return None;
        }
        inner.phase = SessionPhase::Processing;

        let recorded = match inner.recorder.stop().await {
            Ok(Some(audio)) => audio,
            Ok(None) => {
                inner.transcriber.abort();
                Self::fail(&mut inner, "Recording produced no result".to_string());
                return None;
            }
            Err(e) => {
                inner.transcriber.abort();
                Self::fail(&mut inner, format!("Could not stop recording: {}", e));
                return None;
            }
        };

        // Graceful stop: an in-flight utterance still delivers its final.
        inner.transcriber.stop_listening().await;
        if let Some(e) = inner.transcriber.take_error() {
            warn!("recognition ended with error: {}", e);
        }
        let heard = inner.transcriber.snapshot();
        let transcript = if !heard.final_text.is_empty() {
            heard.final_text.clone()
        } else if !heard.interim_text.is_empty() {
            heard.interim_text.clone()
        } else {
            format!("Audio response ({}s)", recorded.duration_secs)
        };
        let confidence = heard.is_final.then_some(heard.confidence);

        inner.attempt += 1;
        let attempt = inner.attempt;
        let question = inner.question.clone();

        let feedback = {
            let Inner {
                generator,
                profile,
                history,
                ..
            } = &mut *inner;
            generator.generate(&question, &transcript, attempt, profile, history)
        };

        inner.history.push(Turn {
            transcript: transcript.clone(),
            reply: feedback.message.clone(),
            score: feedback.score,
        });
        inner.transcript = transcript.clone();
        inner.feedback = Some(feedback.clone());
        inner.last_recording = Some(recorded.clone());
        inner
            .log
            .push(MessageLogEntry::user(&*transcript, recorded.duration_secs, confidence));
        inner.log.push(MessageLogEntry::ai(&feedback));

        self.persist_turn(&question, &transcript, &feedback, recorded.duration_secs)
            .await;

        inner.phase = SessionPhase::Speaking;
        let spoken = format!("{} {}", feedback.message, feedback.follow_up_question);
        let mood = feedback.mood;
        drop(inner);

        if self.config.narration_enabled {
            // Narration errors count as completion; the turn is already done.
            if let Err(e) = self.narrator.narrate(&spoken, mood, &self.config.language).await {
                warn!("narration failed: {}", e);
            }
        }

        let mut inner = self.inner.lock().await;
        if inner.phase == SessionPhase::Speaking {
            inner.phase = SessionPhase::Idle;
        }

        Some(feedback)
    }

    /// Move on to the next prompt. Rejected while a turn is being recorded
    /// or processed.
    pub async fn new_question(&self) -> Result<Question, SessionError> {
        let mut inner = self.inner.lock().await;
        match inner.phase {
            SessionPhase::Recording => return Err(SessionError::Busy("recording")),
            SessionPhase::Processing => return Err(SessionError::Busy("processing")),
            _ => {}
        }

        inner.attempt = 0;
        inner.transcript.clear();
        inner.feedback = None;
        inner.error = None;

        let question = self.bank.next_question(self.config.level);
        inner.question = question.clone();
        inner.log.push(MessageLogEntry::bot(question.text.clone()));

        info!("new question drawn: {}", question.text);
        Ok(question)
    }

    /// Reset the conversation: stop whatever is in flight and clear the
    /// per-turn state and message log. The learner profile persists for the
    /// lifetime of the session.
    pub async fn clear_session(&self) {
        let mut inner = self.inner.lock().await;
        self.narrator.cancel();
        inner.transcriber.abort();
        inner.recorder.cleanup().await;

        inner.attempt = 0;
        inner.transcript.clear();
        inner.feedback = None;
        inner.last_recording = None;
        inner.error = None;
        inner.history.clear();
        inner.log.clear();
        let question_text = inner.question.text.clone();
        inner.log.push(MessageLogEntry::bot(question_text));
        inner.phase = SessionPhase::Idle;
    }

    /// Scoped teardown: cancel in-flight capture, recognition, and
    /// narration. The microphone is released before this returns, whatever
    /// state the session was in.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        self.narrator.cancel();
        inner.transcriber.abort();
        inner.recorder.cleanup().await;
        inner.phase = SessionPhase::Idle;
        info!("practice session {} shut down", self.config.session_id);
    }

    /// Read-only view for the presentation layer. While recording, the
    /// transcript fields track the recognizer live.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        let live = inner.transcriber.snapshot();
        let recording = inner.phase == SessionPhase::Recording;

        let transcript = if recording && !live.final_text.is_empty() {
            live.final_text
        } else {
            inner.transcript.clone()
        };

        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            phase: inner.phase,
            question: inner.question.clone(),
            attempt_number: inner.attempt,
            transcript,
            interim_transcript: if recording { live.interim_text } else { String::new() },
            feedback: inner.feedback.clone(),
            message_log: inner.log.clone(),
            profile: inner.profile.clone(),
            error: inner.error.clone(),
        }
    }

    /// The finalized WAV of the most recent turn, for playback by the
    /// presentation layer.
    pub async fn last_recording(&self) -> Option<RecordedAudio> {
        let inner = self.inner.lock().await;
        inner.last_recording.clone()
    }

    /// Best-effort persistence: failures are logged and never block the
    /// session flow.
    async fn persist_turn(
        &self,
        question: &Question,
        transcript: &str,
        feedback: &FeedbackResponse,
        duration_secs: u64,
    ) {
        let now = Utc::now();
        let record = SessionRecord {
            user_id: self.config.user_id.clone(),
            date: now.date_naive(),
            question: question.text.clone(),
            transcript: transcript.to_string(),
            score: feedback.score,
            duration_secs,
            recorded_at: now,
        };
        if let Err(e) = self.store.append_session(&record).await {
            warn!("failed to persist session record: {}", e);
        }

        let delta = ProgressDelta {
            user_id: self.config.user_id.clone(),
            date: now.date_naive(),
            score: feedback.score,
            duration_secs,
        };
        match self.store.apply_progress(&delta).await {
            Ok(progress) => debug!(
                "daily progress: {} answered, average {:.0}",
                progress.questions_answered, progress.average_score
            ),
            Err(e) => warn!("failed to update daily progress: {}", e),
        }
    }

    /// Surface one error message and enter the transient error phase. The
    /// next user action clears it.
    fn fail(inner: &mut Inner, message: String) {
        error!("session error: {}", message);
        inner.log.push(MessageLogEntry::system(message.clone()));
        inner.error = Some(message);
        inner.phase = SessionPhase::Error;
    }
}
