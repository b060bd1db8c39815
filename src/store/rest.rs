use chrono::NaiveDate;
use tracing::info;

use super::records::{ProgressDelta, ProgressRecord, SessionRecord};
use super::{ProgressStore, StoreError};

/// Document-store client over REST.
///
/// Session records are appended as documents; daily progress is a
/// read-modify-write upsert keyed by user and date. Every call is a single
/// best-effort attempt - the caller treats failures as non-fatal.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        info!("Using document store at {}", base_url);
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn sessions_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/sessions", self.base_url, user_id)
    }

    fn progress_url(&self, user_id: &str, date: NaiveDate) -> String {
        format!("{}/users/{}/progress/{}", self.base_url, user_id, date)
    }
}

#[async_trait::async_trait]
impl ProgressStore for RestStore {
    async fn append_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.sessions_url(&record.user_id))
            .json(record)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn apply_progress(&self, delta: &ProgressDelta) -> Result<ProgressRecord, StoreError> {
        let mut record = self
            .daily_progress(&delta.user_id, delta.date)
            .await?
            .unwrap_or_else(|| ProgressRecord::empty(delta.user_id.clone(), delta.date));
        record.absorb(delta);

        let response = self
            .client
            .put(self.progress_url(&delta.user_id, delta.date))
            .json(&record)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }
        Ok(record)
    }

    async fn daily_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        let response = self
            .client
            .get(self.progress_url(user_id, date))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        let record = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(Some(record))
    }

    async fn recent_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let response = self
            .client
            .get(self.sessions_url(user_id))
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }

        let sessions = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(sessions)
    }
}
