use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info};

use crate::calculations::CalculationRecord;
use crate::db_router::StoreRegistry;
use crate::tasks_queue::AddTask;

/// Consumes addition tasks from the shared queue, simulates the processing
/// latency, and records the outcome through the routed store.
pub struct Worker {
    worker_id: usize,
    delay: Duration,
    registry: Arc<StoreRegistry>,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<AddTask>>>,
}

impl Worker {
    pub fn new(
        worker_id: usize,
        delay: Duration,
        registry: Arc<StoreRegistry>,
        queue: Arc<Mutex<mpsc::UnboundedReceiver<AddTask>>>,
    ) -> Self {
        Self {
            worker_id,
            delay,
            registry,
            queue,
        }
    }

    pub async fn run(self) {
        info!(worker_id = self.worker_id, "worker started");
        loop {
            // Only one worker at a time waits on the shared receiver; the lock
            // is released before processing so the others can keep draining.
            let task = {
                let mut queue = self.queue.lock().await;
                queue.recv().await
            };
            match task {
                Some(task) => {
                    self.process(task).await;
                }
                None => {
                    info!(worker_id = self.worker_id, "queue closed, worker stopping");
                    break;
                }
            }
        }
    }

    /// Run one addition to completion. A failed write is logged but does not
    /// fail the computation: the arithmetic result is still returned.
    pub async fn process(&self, task: AddTask) -> i64 {
        info!(
            worker_id = self.worker_id,
            task_id = %task.task_id,
            "processing task: adding {} + {}",
            task.x,
            task.y
        );
        tokio::time::sleep(self.delay).await;

        // The original backing model had arbitrary precision; wrap rather
        // than panic at the i64 boundary.
        let result = task.x.wrapping_add(task.y);

        let store = self.registry.resolve_store(task.server_id);
        let record = CalculationRecord {
            x: task.x,
            y: task.y,
            result,
            server_id: task.server_id,
            task_id: Some(task.task_id.clone()),
            created_at: task.created_at,
            processed_at: Utc::now(),
        };
        if let Err(e) = store.insert(record).await {
            error!(
                task_id = %task.task_id,
                server_id = task.server_id,
                "failed to persist calculation record: {e}"
            );
        }

        info!(
            task_id = %task.task_id,
            "task complete: {} + {} = {}",
            task.x,
            task.y,
            result
        );
        result
    }
}
