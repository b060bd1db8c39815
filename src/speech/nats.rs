use anyhow::{Context, Result};
use base64::Engine;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::audio::AudioFrame;

use super::recognizer::{
    RecognitionConfig, RecognitionError, RecognitionEvent, RecognitionHandle, RecognitionSession,
    SpeechRecognizer,
};

/// Audio frame message published to NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioFrameMessage {
    pub session_id: String,
    pub sequence: u32,
    pub pcm: String, // Base64-encoded PCM bytes
    pub sample_rate: u32,
    pub channels: u16,
    pub timestamp: String, // RFC3339 timestamp
    #[serde(rename = "final")]
    pub final_frame: bool,
}

/// Transcript message received from the STT service
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    pub confidence: f32,
}

const TRANSCRIPT_SUBJECT: &str = "stt.text.>";

/// Recognition provider backed by a streaming STT service over NATS.
///
/// Each `listen` opens its own stream id: captured frames are published as
/// base64 PCM to `speech.frame.<id>` and partial/final transcripts arrive on
/// `stt.text.>`, filtered back to the session by id.
pub struct NatsRecognizer {
    client: async_nats::Client,
}

impl NatsRecognizer {
    /// Connect to the NATS server backing the STT service.
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for NatsRecognizer {
    async fn listen(
        &self,
        config: RecognitionConfig,
    ) -> Result<RecognitionSession, RecognitionError> {
        let stream_id = uuid::Uuid::new_v4().to_string();

        let mut subscriber = self
            .client
            .subscribe(TRANSCRIPT_SUBJECT)
            .await
            .map_err(|e| RecognitionError::Network(e.to_string()))?;

        let (event_tx, events) = mpsc::channel(32);
        let (control, mut stop_rx) = RecognitionHandle::channel();
        let (frame_tx, mut frame_rx) = mpsc::channel::<AudioFrame>(64);

        // Frame publisher: captured audio out to the STT service.
        let client = self.client.clone();
        let subject = format!("speech.frame.{}", stream_id);
        let publisher_id = stream_id.clone();
        tokio::spawn(async move {
            let mut sequence = 0u32;
            while let Some(frame) = frame_rx.recv().await {
                let pcm_bytes: Vec<u8> =
                    frame.samples.iter().flat_map(|s| s.to_le_bytes()).collect();
                let message = AudioFrameMessage {
                    session_id: publisher_id.clone(),
                    sequence,
                    pcm: base64::engine::general_purpose::STANDARD.encode(&pcm_bytes),
                    sample_rate: frame.sample_rate,
                    channels: frame.channels,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    final_frame: false,
                };
                let payload = match serde_json::to_vec(&message) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("failed to encode audio frame message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                    warn!("failed to publish audio frame: {}", e);
                    break;
                }
                sequence += 1;
            }

            // Final frame marker so the service can flush its last utterance.
            let message = AudioFrameMessage {
                session_id: publisher_id,
                sequence,
                pcm: String::new(),
                sample_rate: 16000,
                channels: 1,
                timestamp: chrono::Utc::now().to_rfc3339(),
                final_frame: true,
            };
            if let Ok(payload) = serde_json::to_vec(&message) {
                if let Err(e) = client.publish(subject, payload.into()).await {
                    warn!("failed to publish final frame marker: {}", e);
                }
            }
        });

        // Transcript consumer: partial/final text back into recognition events.
        let continuous = config.continuous;
        let interim_results = config.interim_results;
        tokio::spawn(async move {
            let mut stopping = false;
            let mut utterance_open = false;
            loop {
                tokio::select! {
                    _ = stop_rx.recv(), if !stopping => {
                        stopping = true;
                        // Graceful stop: let an in-flight utterance finish.
                        if !utterance_open {
                            break;
                        }
                    }
                    msg = subscriber.next() => {
                        let Some(msg) = msg else {
                            let _ = event_tx
                                .send(RecognitionEvent::Error(RecognitionError::Network(
                                    "transcript stream closed".to_string(),
                                )))
                                .await;
                            break;
                        };
                        match serde_json::from_slice::<TranscriptMessage>(&msg.payload) {
                            Ok(transcript) if transcript.session_id == stream_id => {
                                if transcript.partial {
                                    utterance_open = true;
                                    if interim_results {
                                        let _ = event_tx
                                            .send(RecognitionEvent::Interim { text: transcript.text })
                                            .await;
                                    }
                                } else {
                                    utterance_open = false;
                                    let _ = event_tx
                                        .send(RecognitionEvent::Final {
                                            text: transcript.text,
                                            confidence: transcript.confidence,
                                        })
                                        .await;
                                    if stopping || !continuous {
                                        break;
                                    }
                                }
                            }
                            Ok(_) => {} // another session's transcript
                            Err(e) => {
                                warn!("failed to parse transcript message: {}", e);
                            }
                        }
                    }
                }
            }
        });

        Ok(RecognitionSession {
            events,
            control,
            frames: Some(frame_tx),
        })
    }

    fn name(&self) -> &str {
        "nats-stt"
    }
}
