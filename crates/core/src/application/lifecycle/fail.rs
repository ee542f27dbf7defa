// Fail Use Case
//
// running -> queued (retry, backoff applied) or running -> dead (attempts
// exhausted). The store owns the final queued-vs-dead decision (it alone
// sees the authoritative attempts/max_attempts under the CAS); this use
// case only computes the backoff target to hand it, by reading attempts
// from a plain (non-authoritative) get — if the job moved on in the
// meantime, the CAS in `fail` will simply decline (`Ok(None)`) and the
// backoff we computed is discarded along with the rest of the request.

use crate::application::backoff::RetryPolicy;
use crate::domain::{Job, JobId, WorkerId};
use crate::error::{AppError, Result};
use crate::port::{JobStore, TimeProvider};

pub async fn execute(
    store: &dyn JobStore,
    time_provider: &dyn TimeProvider,
    retry_policy: &RetryPolicy,
    id: &JobId,
    worker_id: &WorkerId,
    error: &str,
) -> Result<Job> {
    let now = time_provider.now_millis();

    let job = store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {id} not found")))?;

    let attempts_after = job.attempts + 1;
    let next_run_at = match retry_policy.decide(attempts_after, job.max_attempts, now) {
        crate::application::backoff::RetryDecision::Retry { next_run_at } => next_run_at,
        crate::application::backoff::RetryDecision::Exhausted => now,
    };

    store
        .fail(id, worker_id, error, next_run_at, now)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "job {id} is not leased by worker {worker_id}, or is not running"
            ))
        })
}
