use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::response::BacktestResponse;

/// Lifecycle state of a submitted backtest job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// What the job store keeps per job id. `result`/`error` are populated
/// exclusively, depending on `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BacktestResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobRecord {
    pub fn pending(job_id: Uuid, submitted_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            status: JobStatus::Pending,
            submitted_at,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    pub fn set_running(&mut self, started_at: DateTime<Utc>) {
        self.status = JobStatus::Running;
        self.started_at = Some(started_at);
    }

    pub fn set_completed(&mut self, completed_at: DateTime<Utc>, result: BacktestResponse) {
        self.status = JobStatus::Completed;
        self.completed_at = Some(completed_at);
        self.result = Some(result);
    }

    pub fn set_failed(&mut self, completed_at: DateTime<Utc>, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.completed_at = Some(completed_at);
        self.error = Some(error.into());
    }

    pub fn set_cancelled(&mut self, completed_at: DateTime<Utc>) {
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(completed_at);
    }
}
