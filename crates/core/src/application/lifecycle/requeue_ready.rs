// Requeue-Ready Use Case
//
// Bridges backoff-scheduled retries to the ready-queue hint: a job whose
// `next_run_at` has just elapsed is not otherwise announced to the hint
// until someone looks for it, so this scans queued jobs and re-seeds the
// hint for every one that has become leaseable. Bounded by `limit`,
// ordered by priority desc then created_at asc per the selection policy.

use tracing::debug;

use crate::error::Result;
use crate::port::{JobListFilter, JobStore, ReadyQueueHint, TimeProvider};

pub async fn execute(
    store: &dyn JobStore,
    hint: &dyn ReadyQueueHint,
    time_provider: &dyn TimeProvider,
    limit: i64,
) -> Result<usize> {
    let now = time_provider.now_millis();

    let filter = JobListFilter {
        status: Some(crate::domain::JobStatus::Queued),
        job_type: None,
        limit,
        offset: 0,
    };

    let mut candidates = store.list(&filter).await?;
    candidates.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut pushed = 0;
    for job in candidates {
        if job.is_leaseable(now) {
            debug!(job_id = %job.id, "requeue_ready: pushing leaseable job into ready-queue hint");
            hint.push(job.id).await;
            pushed += 1;
        }
    }

    Ok(pushed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Job, JobPayload, JobType};
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::ready_queue_hint::mocks::InMemoryReadyQueueHint;
    use crate::port::time_provider::mocks::MockTimeProvider;

    #[tokio::test]
    async fn pushes_only_jobs_whose_backoff_has_elapsed() {
        let store = InMemoryJobStore::new();
        let hint = InMemoryReadyQueueHint::new();
        let clock = MockTimeProvider::new(5_000);

        let ready = Job::new_test(JobType::new("t"), JobPayload::new(serde_json::json!({})));
        let mut not_ready =
            Job::new_test(JobType::new("t"), JobPayload::new(serde_json::json!({})));
        not_ready.next_run_at = Some(10_000);

        store.seed(ready);
        store.seed(not_ready);

        let pushed = execute(&store, &hint, &clock, 100).await.unwrap();
        assert_eq!(pushed, 1);
        assert_eq!(hint.len().await, 1);
    }

    #[tokio::test]
    async fn pushes_in_priority_desc_created_at_asc_order() {
        let store = InMemoryJobStore::new();
        let hint = InMemoryReadyQueueHint::new();
        let clock = MockTimeProvider::new(5_000);

        let mut low = Job::new_test(JobType::new("t"), JobPayload::new(serde_json::json!({})));
        low.priority = 1;
        let mut high = Job::new_test(JobType::new("t"), JobPayload::new(serde_json::json!({})));
        high.priority = 10;

        store.seed(low);
        store.seed(high.clone());

        let pushed = execute(&store, &hint, &clock, 100).await.unwrap();
        assert_eq!(pushed, 2);
        assert_eq!(hint.pop().await.as_deref(), Some(high.id.as_str()));
    }
}
