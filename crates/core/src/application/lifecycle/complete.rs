// Complete Use Case
//
// running -> completed, conditioned on the caller still holding the lease.

use crate::domain::{Job, JobId, WorkerId};
use crate::error::{AppError, Result};
use crate::port::{JobStore, TimeProvider};

pub async fn execute(
    store: &dyn JobStore,
    time_provider: &dyn TimeProvider,
    id: &JobId,
    worker_id: &WorkerId,
) -> Result<Job> {
    let now = time_provider.now_millis();
    store.complete(id, worker_id, now).await?.ok_or_else(|| {
        AppError::Conflict(format!(
            "job {id} is not leased by worker {worker_id}, or is not running"
        ))
    })
}
