use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use quantor_model::{BacktestResponse, JobRecord, JobStatus};

/// Why a cancel request couldn't evict the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CancelError {
    #[error("unknown job id")]
    Unknown,
    #[error("job is not pending")]
    NotPending,
}

/// Thread-safe async store mapping job id -> [`JobRecord`].
///
/// Status transitions: `create` -> Pending, `set_running` -> Running,
/// `set_completed`/`set_failed` -> Completed/Failed (record persists for
/// polling), `set_cancelled` evicts the record entirely — only meaningful
/// from Pending.
#[derive(Clone, Default)]
pub struct JobStore {
    records: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, job_id: Uuid) -> JobRecord {
        let record = JobRecord::pending(job_id, Utc::now());
        self.records.write().await.insert(job_id, record.clone());
        record
    }

    pub async fn set_running(&self, job_id: Uuid) {
        if let Some(record) = self.records.write().await.get_mut(&job_id) {
            record.set_running(Utc::now());
        }
    }

    pub async fn set_completed(&self, job_id: Uuid, result: BacktestResponse) {
        if let Some(record) = self.records.write().await.get_mut(&job_id) {
            record.set_completed(Utc::now(), result);
        }
    }

    pub async fn set_failed(&self, job_id: Uuid, error: impl Into<String>) {
        if let Some(record) = self.records.write().await.get_mut(&job_id) {
            record.set_failed(Utc::now(), error);
        }
    }

    /// Evicts the record only if it's still PENDING; otherwise leaves it
    /// untouched and reports why.
    pub async fn cancel_if_pending(&self, job_id: Uuid) -> Result<(), CancelError> {
        let mut records = self.records.write().await;
        match records.get(&job_id) {
            None => Err(CancelError::Unknown),
            Some(record) if record.status != JobStatus::Pending => Err(CancelError::NotPending),
            Some(_) => {
                records.remove(&job_id);
                Ok(())
            }
        }
    }

    pub async fn get(&self, job_id: Uuid) -> Option<JobRecord> {
        self.records.read().await.get(&job_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).await;

        let record = store.get(id).await.unwrap();
        assert_eq!(record.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn set_running_then_failed_transitions_status() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).await;
        store.set_running(id).await;
        assert_eq!(store.get(id).await.unwrap().status, JobStatus::Running);

        store.set_failed(id, "boom").await;
        let record = store.get(id).await.unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn cancel_evicts_a_pending_record() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).await;
        assert_eq!(store.cancel_if_pending(id).await, Ok(()));
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn cancel_refuses_a_running_record() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.create(id).await;
        store.set_running(id).await;
        assert_eq!(
            store.cancel_if_pending(id).await,
            Err(CancelError::NotPending)
        );
        assert!(store.get(id).await.is_some());
    }

    #[tokio::test]
    async fn cancel_reports_unknown_job_ids() {
        let store = JobStore::new();
        assert_eq!(
            store.cancel_if_pending(Uuid::new_v4()).await,
            Err(CancelError::Unknown)
        );
    }

    #[tokio::test]
    async fn unknown_job_id_is_a_no_op() {
        let store = JobStore::new();
        store.set_running(Uuid::new_v4()).await;
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }
}
