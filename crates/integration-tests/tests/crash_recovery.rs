//! Crash recovery: a worker that leases and starts a job, then disappears
//! without completing or failing it, leaves a lease that `reconcile` must
//! eventually sweep back to queued (or dead, once attempts run out).

use std::sync::atomic::{AtomicI64, Ordering};

use jobkeeper_core::application::lifecycle::{lease, reconcile, start, submit};
use jobkeeper_core::port::id_provider::UuidIdProvider;
use jobkeeper_core::port::TimeProvider;
use jobkeeper_infra_hint::InProcessReadyQueueHint;
use jobkeeper_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};

struct MockTimeProvider {
    now: AtomicI64,
}

impl MockTimeProvider {
    fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn a_crashed_workers_lease_is_recovered_back_to_queued() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let store = SqliteJobStore::new(pool);
    let hint = InProcessReadyQueueHint::new();
    let time_provider = MockTimeProvider::new(1_000_000);
    let id_provider = UuidIdProvider;

    let job = submit(
        &store,
        &id_provider,
        &time_provider,
        jobkeeper_core::application::lifecycle::submit::SubmitRequest {
            job_type: "long_running_job".to_string(),
            payload: serde_json::json!({}),
            priority: 5,
            max_attempts: 3,
        },
    )
    .await
    .unwrap();

    lease(&store, &time_provider, &job.id, &"doomed-worker".to_string(), 5)
        .await
        .expect("job should be leaseable");
    start(&store, &time_provider, &job.id, &"doomed-worker".to_string())
        .await
        .unwrap();

    // doomed-worker vanishes here: no complete, no fail. Lease (5s) expires.
    time_provider.advance(6_000);

    let outcome = reconcile(&store, &hint, &time_provider, 100).await.unwrap();
    assert_eq!(outcome.recovered, 1);
    assert_eq!(outcome.dead, 0);
    assert_eq!(hint.len().await, 1, "reconcile re-seeds the ready-queue hint");

    // A second sweep immediately after finds nothing left to recover.
    let second_sweep = reconcile(&store, &hint, &time_provider, 100).await.unwrap();
    assert_eq!(second_sweep.recovered, 0);
    assert_eq!(second_sweep.dead, 0);
}

#[tokio::test]
async fn a_job_that_exhausts_attempts_via_repeated_crashes_goes_dead() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let store = SqliteJobStore::new(pool);
    let hint = InProcessReadyQueueHint::new();
    let time_provider = MockTimeProvider::new(1_000_000);
    let id_provider = UuidIdProvider;

    let job = submit(
        &store,
        &id_provider,
        &time_provider,
        jobkeeper_core::application::lifecycle::submit::SubmitRequest {
            job_type: "cursed_job".to_string(),
            payload: serde_json::json!({}),
            priority: 5,
            max_attempts: 1,
        },
    )
    .await
    .unwrap();

    lease(&store, &time_provider, &job.id, &"doomed-worker".to_string(), 5)
        .await
        .unwrap();
    start(&store, &time_provider, &job.id, &"doomed-worker".to_string())
        .await
        .unwrap();

    time_provider.advance(6_000);

    let outcome = reconcile(&store, &hint, &time_provider, 100).await.unwrap();
    assert_eq!(outcome.recovered, 0);
    assert_eq!(outcome.dead, 1, "max_attempts == 1, one crash exhausts it");
    assert!(hint.len().await == 0, "a dead job is never re-seeded into the hint");
}
