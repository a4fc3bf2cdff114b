use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-symbol mutex table backing the cache's lockless-pre-scan-then-confirm
/// protocol: callers check the on-disk cache without locking, and only take
/// a lock when a fetch actually needs to happen.
#[derive(Default)]
pub struct SymbolLockTable {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SymbolLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, symbol: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire locks for every symbol in `symbols`, always in sorted order,
    /// so two callers racing over overlapping symbol sets can never deadlock
    /// waiting on each other's locks in opposite order.
    pub async fn acquire_sorted(&self, symbols: &[String]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted: Vec<&String> = symbols.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for symbol in sorted {
            let mutex = self.lock_for(symbol);
            guards.push(mutex.lock_owned().await);
        }
        guards
    }
}
