use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// One addition waiting to run.
#[derive(Debug, Clone)]
pub struct AddTask {
    pub x: i64,
    pub y: i64,
    pub server_id: i64,
    pub task_id: String,
    /// When the task was enqueued.
    pub created_at: DateTime<Utc>,
}

impl AddTask {
    pub fn new(x: i64, y: i64, server_id: i64) -> Self {
        Self {
            x,
            y,
            server_id,
            task_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Sending half of the work queue. The endpoint enqueues and moves on; results
/// only become visible later through the record stores.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<AddTask>,
}

impl TaskQueue {
    /// Enqueue one addition and return the task so the caller can echo its id.
    /// A closed queue is logged, not propagated: submission is fire-and-forget.
    pub fn enqueue(&self, x: i64, y: i64, server_id: i64) -> AddTask {
        let task = AddTask::new(x, y, server_id);
        if self.tx.send(task.clone()).is_err() {
            warn!(task_id = %task.task_id, "no workers are listening, task dropped");
        }
        task
    }
}

pub fn channel() -> (TaskQueue, mpsc::UnboundedReceiver<AddTask>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TaskQueue { tx }, rx)
}
