use serde::{Deserialize, Serialize};

use crate::questions::Level;

/// Configuration for one practice session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g. "practice-2026-08-07-morning")
    pub session_id: String,

    /// Owner of the persisted progress records
    pub user_id: String,

    /// Difficulty level questions are drawn at
    pub level: Level,

    /// BCP-47 tag used for both recognition and narration
    pub language: String,

    /// Deliver interim recognition results while an utterance is in flight
    pub interim_results: bool,

    /// Narrate feedback after each turn
    pub narration_enabled: bool,

    /// Seed for the score perturbation; unset disables it
    pub perturbation_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("practice-{}", uuid::Uuid::new_v4()),
            user_id: "local".to_string(),
            level: Level::Beginner,
            language: "en-US".to_string(),
            interim_results: true,
            narration_enabled: true,
            perturbation_seed: None,
        }
    }
}
