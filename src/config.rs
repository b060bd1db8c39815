use anyhow::Result;
use serde::Deserialize;

use crate::questions::Level;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub speech: SpeechConfig,
    pub coach: CoachConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// BCP-47 tag used for recognition and narration
    pub language: String,
    /// Deliver interim recognition results
    pub interim_results: bool,
    /// NATS server backing the STT service; unset disables recognition
    pub nats_url: Option<String>,
    /// Narrate feedback after each turn
    pub narration_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Difficulty level for new sessions
    pub level: Level,
    /// Seed for the score perturbation; unset disables it
    pub perturbation_seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Document-store REST endpoint; unset keeps progress in memory
    pub base_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "talkdrill".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz, what the STT bridge expects
            channels: 1,        // Mono
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            interim_results: true,
            nats_url: None,
            narration_enabled: true,
        }
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            level: Level::Beginner,
            perturbation_seed: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { base_url: None }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            audio: AudioConfig::default(),
            speech: SpeechConfig::default(),
            coach: CoachConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
