use std::sync::Arc;

use uuid::Uuid;

use quantor_orchestrator::Orchestrator;

use crate::job_store::JobStore;
use crate::kv_store::KvStore;
use crate::queue::JobQueue;

/// Background consumer tying the job queue, the request KV store, and the
/// job record store together: pulls a job id off the queue, looks up the
/// request that was stashed for it, and runs it through the orchestrator on
/// its own task so the consumer loop is never blocked by a single backtest.
#[derive(Clone)]
pub struct Scheduler {
    orchestrator: Arc<Orchestrator>,
    jobs: JobStore,
    requests: KvStore,
    queue: JobQueue,
}

impl Scheduler {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            jobs: JobStore::new(),
            requests: KvStore::new(),
            queue: JobQueue::new(),
        }
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    /// Runs a backtest through the orchestrator directly, bypassing the
    /// queue. Used by the synchronous HTTP endpoint — callers block on the
    /// result instead of polling a job id.
    pub async fn run_sync(
        &self,
        request: quantor_model::BacktestRequest,
    ) -> Result<quantor_model::BacktestResponse, quantor_model::PipelineError> {
        self.orchestrator.run(request).await
    }

    /// Registers a new job and enqueues it for execution. The caller is
    /// responsible for stashing the request with `self.requests` first via
    /// [`Scheduler::submit`].
    pub async fn submit(&self, request: quantor_model::BacktestRequest) -> Uuid {
        let job_id = Uuid::new_v4();
        self.requests.set(job_id, request).await;
        self.jobs.create(job_id).await;
        self.queue.put(job_id);
        job_id
    }

    /// Cancels a PENDING job. Leaves RUNNING/terminal jobs untouched —
    /// callers map the returned [`crate::job_store::CancelError`] to 404/409.
    pub async fn cancel(&self, job_id: Uuid) -> Result<(), crate::job_store::CancelError> {
        self.jobs.cancel_if_pending(job_id).await?;
        self.requests.delete(job_id).await;
        Ok(())
    }

    /// Runs for the lifetime of the process, dequeuing job ids and spawning
    /// one task per admitted job. Never returns under normal operation.
    pub async fn run(self) {
        tracing::info!("scheduler started");
        loop {
            let Some(job_id) = self.queue.get().await else {
                tracing::warn!("job queue closed, scheduler stopping");
                return;
            };

            if self.jobs.get(job_id).await.is_none() {
                tracing::debug!(%job_id, "skipping cancelled job");
                continue;
            }

            let scheduler = self.clone();
            tokio::spawn(async move { scheduler.execute_job(job_id).await });
        }
    }

    async fn execute_job(&self, job_id: Uuid) {
        let Some(request) = self.requests.get(job_id).await else {
            // Cancelled between dequeue and task start.
            return;
        };

        self.jobs.set_running(job_id).await;
        tracing::info!(%job_id, start = %request.start_date, end = %request.end_date, "executing job");

        match self.orchestrator.run(request).await {
            Ok(response) => {
                tracing::info!(%job_id, sharpe = response.metrics.sharpe, "job completed");
                self.jobs.set_completed(job_id, response).await;
            }
            Err(err) => {
                tracing::error!(%job_id, error = %err, "job failed");
                self.jobs.set_failed(job_id, err.to_string()).await;
            }
        }

        self.requests.delete(job_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quantor_market_data::MarketDataProvider;
    use quantor_model::{BacktestRequest, ErrorList, JobStatus};
    use quantor_sandbox::SandboxConfig;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn request(strategy_code: &str) -> BacktestRequest {
        BacktestRequest {
            strategy_code: strategy_code.into(),
            name: None,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            initial_capital: Decimal::from(10_000),
            commission: Decimal::ZERO,
            slippage: Decimal::ZERO,
            errors: ErrorList::new(),
        }
    }

    #[tokio::test]
    async fn submit_creates_a_pending_record() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MarketDataProvider::new(dir.path()));
        let orchestrator = Arc::new(Orchestrator::new(provider, SandboxConfig::default()));
        let scheduler = Scheduler::new(orchestrator);

        let job_id = scheduler.submit(request("class S(Strategy): pass")).await;
        let record = scheduler.jobs().get(job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn cancel_evicts_the_pending_record() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MarketDataProvider::new(dir.path()));
        let orchestrator = Arc::new(Orchestrator::new(provider, SandboxConfig::default()));
        let scheduler = Scheduler::new(orchestrator);

        let job_id = scheduler.submit(request("class S(Strategy): pass")).await;
        assert!(scheduler.cancel(job_id).await.is_ok());
        assert!(scheduler.jobs().get(job_id).await.is_none());
    }

    #[tokio::test]
    async fn consumer_loop_fails_a_job_that_cannot_pass_validation() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MarketDataProvider::new(dir.path()));
        let orchestrator = Arc::new(Orchestrator::new(provider, SandboxConfig::default()));
        let scheduler = Scheduler::new(orchestrator);

        let mut bad_request = request("import os\nclass S(Strategy): pass");
        bad_request.end_date = bad_request.start_date;
        let job_id = scheduler.submit(bad_request).await;

        let runner = scheduler.clone();
        let handle = tokio::spawn(async move { runner.run().await });

        let record = loop {
            if let Some(record) = scheduler.jobs().get(job_id).await {
                if record.status != JobStatus::Pending && record.status != JobStatus::Running {
                    break record;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        };

        assert_eq!(record.status, JobStatus::Failed);
        handle.abort();
    }
}
