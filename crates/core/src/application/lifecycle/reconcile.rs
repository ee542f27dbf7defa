// Reconcile Use Case
//
// Two bounded phases: (1) expired-running recovery — sweep
// running jobs whose lease has lapsed back to queued or dead, the
// crashed- or wedged-worker case; (2) ready-queue refresh — re-seed the
// hint for every queued job that is now leaseable, including the ones
// phase 1 just requeued.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::port::{JobStore, ReadyQueueHint, TimeProvider};

/// Aggregate counts for a single `reconcile` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub recovered: usize,
    pub dead: usize,
    pub requeued: usize,
}

pub async fn execute(
    store: &dyn JobStore,
    hint: &dyn ReadyQueueHint,
    time_provider: &dyn TimeProvider,
    limit: i64,
) -> Result<ReconcileOutcome> {
    let now = time_provider.now_millis();
    let swept = store.reconcile_expired_leases(limit, now).await?;

    let mut recovered = 0;
    let mut dead = 0;

    for job in &swept {
        match job.status {
            crate::domain::JobStatus::Queued => {
                warn!(job_id = %job.id, attempts = job.attempts, "reconciled expired lease, requeued");
                hint.push(job.id.clone()).await;
                recovered += 1;
            }
            crate::domain::JobStatus::Dead => {
                warn!(job_id = %job.id, attempts = job.attempts, "reconciled expired lease, attempts exhausted");
                dead += 1;
            }
            other => {
                warn!(job_id = %job.id, status = %other, "reconcile swept job into unexpected status");
            }
        }
    }

    let requeued = super::requeue_ready::execute(store, hint, time_provider, limit).await?;

    Ok(ReconcileOutcome {
        recovered,
        dead,
        requeued,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Job, JobPayload, JobType};
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::ready_queue_hint::mocks::InMemoryReadyQueueHint;
    use crate::port::time_provider::mocks::MockTimeProvider;

    #[tokio::test]
    async fn requeues_a_job_whose_lease_expired() {
        let store = InMemoryJobStore::new();
        let hint = InMemoryReadyQueueHint::new();
        let clock = MockTimeProvider::new(10_000);

        let mut job = Job::new_test(JobType::new("t"), JobPayload::new(serde_json::json!({})));
        job.max_attempts = 3;
        store.seed(job.clone());
        store.lease(&job.id, &"worker-1".to_string(), 1_000, 1_000).await.unwrap();
        store.start(&job.id, &"worker-1".to_string(), 1_000).await.unwrap();

        let outcome = execute(&store, &hint, &clock, 100).await.unwrap();

        assert_eq!(outcome.recovered, 1);
        assert_eq!(outcome.dead, 0);
        assert_eq!(hint.len().await, 1);
    }

    #[tokio::test]
    async fn kills_a_job_whose_attempts_are_exhausted_on_sweep() {
        let store = InMemoryJobStore::new();
        let hint = InMemoryReadyQueueHint::new();
        let clock = MockTimeProvider::new(10_000);

        let mut job = Job::new_test(JobType::new("t"), JobPayload::new(serde_json::json!({})));
        job.max_attempts = 1;
        store.seed(job.clone());
        store.lease(&job.id, &"worker-1".to_string(), 1_000, 1_000).await.unwrap();
        store.start(&job.id, &"worker-1".to_string(), 1_000).await.unwrap();

        let outcome = execute(&store, &hint, &clock, 100).await.unwrap();

        assert_eq!(outcome.recovered, 0);
        assert_eq!(outcome.dead, 1);
    }

    #[tokio::test]
    async fn leaves_live_leases_untouched() {
        let store = InMemoryJobStore::new();
        let hint = InMemoryReadyQueueHint::new();
        let clock = MockTimeProvider::new(1_500);

        let job = Job::new_test(JobType::new("t"), JobPayload::new(serde_json::json!({})));
        store.seed(job.clone());
        store.lease(&job.id, &"worker-1".to_string(), 30_000, 1_000).await.unwrap();
        store.start(&job.id, &"worker-1".to_string(), 1_000).await.unwrap();

        let outcome = execute(&store, &hint, &clock, 100).await.unwrap();
        assert_eq!(outcome.recovered, 0);
        assert_eq!(outcome.dead, 0);
    }

    #[tokio::test]
    async fn also_refreshes_the_hint_for_jobs_already_due() {
        let store = InMemoryJobStore::new();
        let hint = InMemoryReadyQueueHint::new();
        let clock = MockTimeProvider::new(1_000);

        let ready = Job::new_test(JobType::new("t"), JobPayload::new(serde_json::json!({})));
        store.seed(ready);

        let outcome = execute(&store, &hint, &clock, 100).await.unwrap();
        assert_eq!(outcome.requeued, 1);
    }
}
