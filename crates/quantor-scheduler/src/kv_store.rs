use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use quantor_model::BacktestRequest;

/// Thread-safe async store mapping job id -> the request it was submitted
/// with. Holds the request between `POST /backtests` and the worker task
/// actually picking it up off the queue, then gets cleaned up.
#[derive(Clone, Default)]
pub struct KvStore {
    requests: Arc<RwLock<HashMap<Uuid, BacktestRequest>>>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, job_id: Uuid, request: BacktestRequest) {
        self.requests.write().await.insert(job_id, request);
    }

    pub async fn get(&self, job_id: Uuid) -> Option<BacktestRequest> {
        self.requests.read().await.get(&job_id).cloned()
    }

    pub async fn delete(&self, job_id: Uuid) {
        self.requests.write().await.remove(&job_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quantor_model::ErrorList;
    use rust_decimal::Decimal;

    fn sample_request() -> BacktestRequest {
        BacktestRequest {
            strategy_code: "class S(Strategy): pass".into(),
            name: None,
            start_date: Utc::now(),
            end_date: Utc::now(),
            initial_capital: Decimal::from(10_000),
            commission: Decimal::ZERO,
            slippage: Decimal::ZERO,
            errors: ErrorList::new(),
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = KvStore::new();
        let id = Uuid::new_v4();
        store.set(id, sample_request()).await;
        assert!(store.get(id).await.is_some());
    }

    #[tokio::test]
    async fn delete_removes_the_entry() {
        let store = KvStore::new();
        let id = Uuid::new_v4();
        store.set(id, sample_request()).await;
        store.delete(id).await;
        assert!(store.get(id).await.is_none());
    }
}
