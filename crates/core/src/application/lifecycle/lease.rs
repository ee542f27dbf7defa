// Lease Use Case
//
// Grants a worker a time-bounded reservation on a specific job without
// moving it to running yet — a lease is a reservation, `start` is the
// commitment. The caller picks which job to lease (via `list` or the
// ready-queue hint); this use case only arbitrates the race for that id.

use crate::application::constants::{MAX_LEASE_SECONDS, MIN_LEASE_SECONDS};
use crate::domain::{Job, JobId, WorkerId};
use crate::error::{AppError, Result};
use crate::port::{JobStore, TimeProvider};

pub async fn execute(
    store: &dyn JobStore,
    time_provider: &dyn TimeProvider,
    id: &JobId,
    worker_id: &WorkerId,
    lease_seconds: i64,
) -> Result<Job> {
    if worker_id.is_empty() {
        return Err(AppError::Validation("worker_id cannot be empty".into()));
    }
    if !(MIN_LEASE_SECONDS..=MAX_LEASE_SECONDS).contains(&lease_seconds) {
        return Err(AppError::Validation(format!(
            "lease_seconds out of range (must be between {MIN_LEASE_SECONDS} and {MAX_LEASE_SECONDS}, got {lease_seconds})"
        )));
    }

    let now = time_provider.now_millis();
    store
        .lease(id, worker_id, lease_seconds * 1000, now)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "job {id} is not ready to be leased (not queued, not yet due, or already leased)"
            ))
        })
}
