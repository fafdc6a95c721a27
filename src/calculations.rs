use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// One completed addition: operands, result and processing metadata.
/// Written exactly once at the end of a worker run, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub x: i64,
    pub y: i64,
    pub result: i64,
    /// Logical server that processed the request.
    pub server_id: i64,
    /// Id of the worker task that produced this record, when known.
    pub task_id: Option<String>,
    /// When the task was enqueued.
    pub created_at: DateTime<Utc>,
    /// When the record was persisted. Invariant: `processed_at >= created_at`.
    pub processed_at: DateTime<Utc>,
}

impl CalculationRecord {
    /// How long the task took from enqueue to persistence.
    pub fn processing_duration(&self) -> chrono::Duration {
        self.processed_at - self.created_at
    }
}

impl fmt::Display for CalculationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Server {}: {} + {} = {}",
            self.server_id, self.x, self.y, self.result
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is offline")]
    Offline,
}

/// In-process stand-in for one physical database. Clones share the same
/// backing records; the inner lock is the store's concurrency control for
/// concurrent single-record inserts.
#[derive(Debug, Clone, Default)]
pub struct CalculationStore {
    records: Arc<Mutex<Vec<CalculationRecord>>>,
    offline: Arc<AtomicBool>,
}

impl CalculationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: CalculationRecord) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Offline);
        }
        let mut records = self.records.lock().await;
        records.push(record);
        Ok(())
    }

    /// The most recent records for `server_id`, newest first by `processed_at`.
    pub async fn recent(
        &self,
        server_id: i64,
        limit: usize,
    ) -> Result<Vec<CalculationRecord>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Offline);
        }
        let records = self.records.lock().await;
        let mut matching: Vec<CalculationRecord> = records
            .iter()
            .filter(|r| r.server_id == server_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
        matching.truncate(limit);
        Ok(matching)
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Admin hook: an offline store rejects reads and writes until brought back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}
