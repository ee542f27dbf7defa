// jobkeeper-infra-hint - In-process Ready-Queue Hint adapter
//
// Implements `ReadyQueueHint` (jobkeeper_core::port) as a single
// `tokio::sync::Mutex`-guarded FIFO, local to the daemon process. There is
// nothing durable here by design: a lost hint is recovered by the next
// `requeue_ready` sweep or by a worker falling back to polling `lease`.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use jobkeeper_core::domain::JobId;
use jobkeeper_core::port::ReadyQueueHint;

pub struct InProcessReadyQueueHint {
    queue: Mutex<VecDeque<JobId>>,
}

impl InProcessReadyQueueHint {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl Default for InProcessReadyQueueHint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadyQueueHint for InProcessReadyQueueHint {
    async fn push(&self, id: JobId) {
        let mut queue = self.queue.lock().await;
        debug!(job_id = %id, depth = queue.len() + 1, "ready-queue hint: push");
        queue.push_back(id);
    }

    async fn pop(&self) -> Option<JobId> {
        let mut queue = self.queue.lock().await;
        let popped = queue.pop_front();
        if let Some(id) = &popped {
            debug!(job_id = %id, depth = queue.len(), "ready-queue hint: pop");
        }
        popped
    }

    async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }
}
