use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One answered question, appended after every completed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: String,
    /// Calendar day the answer belongs to (YYYY-MM-DD).
    pub date: NaiveDate,
    pub question: String,
    pub transcript: String,
    pub score: u8,
    pub duration_secs: u64,
    pub recorded_at: DateTime<Utc>,
}

/// The additive update one turn contributes to the daily record. The engine
/// computes this; the store owns the fold.
#[derive(Debug, Clone)]
pub struct ProgressDelta {
    pub user_id: String,
    pub date: NaiveDate,
    pub score: u8,
    pub duration_secs: u64,
}

/// Daily practice progress: one record per user per calendar day, created on
/// the first answer of the day and updated additively thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub questions_answered: u32,
    pub total_score: u64,
    pub average_score: f32,
    pub total_duration_secs: u64,
    /// Earned achievement ids. Monotone: never removed within a day.
    pub achievements: Vec<String>,
}

pub const ACHIEVEMENT_FIRST_SESSION: &str = "first-session";
pub const ACHIEVEMENT_FIVE_A_DAY: &str = "five-a-day";
pub const ACHIEVEMENT_HIGH_SCORE: &str = "high-score";
pub const ACHIEVEMENT_TEN_MINUTES: &str = "ten-minutes";

impl ProgressRecord {
    pub fn empty(user_id: String, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            questions_answered: 0,
            total_score: 0,
            average_score: 0.0,
            total_duration_secs: 0,
            achievements: Vec::new(),
        }
    }

    /// Fold one turn into the daily totals.
    pub fn absorb(&mut self, delta: &ProgressDelta) {
        self.questions_answered += 1;
        self.total_score += delta.score as u64;
        self.average_score = self.total_score as f32 / self.questions_answered as f32;
        self.total_duration_secs += delta.duration_secs;
        self.refresh_achievements(delta.score);
    }

    fn refresh_achievements(&mut self, turn_score: u8) {
        self.earn(ACHIEVEMENT_FIRST_SESSION);
        if self.questions_answered >= 5 {
            self.earn(ACHIEVEMENT_FIVE_A_DAY);
        }
        if turn_score >= 85 {
            self.earn(ACHIEVEMENT_HIGH_SCORE);
        }
        if self.total_duration_secs >= 600 {
            self.earn(ACHIEVEMENT_TEN_MINUTES);
        }
    }

    fn earn(&mut self, id: &str) {
        if !self.achievements.iter().any(|a| a == id) {
            self.achievements.push(id.to_string());
        }
    }
}
