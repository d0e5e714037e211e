//! Result sinks.
//!
//! Persistence is idempotent per (scanner, instrument, trigger time): a
//! re-run upserts instead of appending duplicates. Batches apply atomically
//! so a failed write leaves the sink untouched and never aborts the rest of
//! the backtest.

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;

use scanlab_core::engine::{BacktestResult, ResultKey};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink rejected batch: {0}")]
    Rejected(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downstream consumer of backtest results.
pub trait ResultSink: Send + Sync {
    /// Insert-or-replace a batch, keyed by `BacktestResult::key()`. Either
    /// the whole batch lands or none of it does.
    fn upsert_batch(&self, results: &[BacktestResult]) -> Result<(), SinkError>;
}

/// In-memory sink backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Mutex<BTreeMap<ResultKey, BacktestResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.lock().expect("sink poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all stored results in key order.
    pub fn snapshot(&self) -> Vec<BacktestResult> {
        self.results
            .lock()
            .expect("sink poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl ResultSink for MemorySink {
    fn upsert_batch(&self, results: &[BacktestResult]) -> Result<(), SinkError> {
        let mut store = self.results.lock().expect("sink poisoned");
        for result in results {
            store.insert(result.key(), result.clone());
        }
        Ok(())
    }
}
