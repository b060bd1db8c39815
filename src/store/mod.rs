//! Persistence collaborator
//!
//! Append-only session records plus additive daily progress, behind a trait
//! so the engine never knows which backend it is talking to. Failures here
//! are non-fatal by policy: the orchestrator logs and continues.

pub mod memory;
pub mod records;
pub mod rest;

use chrono::NaiveDate;
use thiserror::Error;

pub use memory::MemoryStore;
pub use records::{
    ProgressDelta, ProgressRecord, SessionRecord, ACHIEVEMENT_FIRST_SESSION,
    ACHIEVEMENT_FIVE_A_DAY, ACHIEVEMENT_HIGH_SCORE, ACHIEVEMENT_TEN_MINUTES,
};
pub use rest::RestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence request failed: {0}")]
    Request(String),
    #[error("persistence backend returned status {0}")]
    Status(u16),
    #[error("invalid persistence payload: {0}")]
    Decode(String),
}

/// Document-store contract for session history and daily progress.
#[async_trait::async_trait]
pub trait ProgressStore: Send + Sync {
    /// Append one completed turn.
    async fn append_session(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Upsert a daily record with one turn's delta and return the new state.
    async fn apply_progress(&self, delta: &ProgressDelta) -> Result<ProgressRecord, StoreError>;

    /// Current daily record, if any.
    async fn daily_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ProgressRecord>, StoreError>;

    /// Most recent session records, newest first.
    async fn recent_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, StoreError>;
}
