use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::records::{ProgressDelta, ProgressRecord, SessionRecord};
use super::{ProgressStore, StoreError};

/// In-memory store used by tests and by servers running without a document
/// store configured.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<Vec<SessionRecord>>,
    progress: RwLock<HashMap<(String, NaiveDate), ProgressRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait::async_trait]
impl ProgressStore for MemoryStore {
    async fn append_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.push(record.clone());
        Ok(())
    }

    async fn apply_progress(&self, delta: &ProgressDelta) -> Result<ProgressRecord, StoreError> {
        let mut progress = self.progress.write().await;
        let record = progress
            .entry((delta.user_id.clone(), delta.date))
            .or_insert_with(|| ProgressRecord::empty(delta.user_id.clone(), delta.date));
        record.absorb(delta);
        Ok(record.clone())
    }

    async fn daily_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        let progress = self.progress.read().await;
        Ok(progress.get(&(user_id.to_string(), date)).cloned())
    }

    async fn recent_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
