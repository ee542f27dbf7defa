//! Leaseable jobs are announced to the ready-queue hint in priority DESC
//! order, ties broken by created_at ASC (oldest first).

use std::time::Duration;

use jobkeeper_core::application::lifecycle::{requeue_ready, submit};
use jobkeeper_core::port::id_provider::UuidIdProvider;
use jobkeeper_core::port::time_provider::SystemTimeProvider;
use jobkeeper_infra_hint::InProcessReadyQueueHint;
use jobkeeper_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};

async fn submit_job(
    store: &SqliteJobStore,
    id_provider: &UuidIdProvider,
    time_provider: &SystemTimeProvider,
    job_type: &str,
    priority: i32,
) -> jobkeeper_core::domain::Job {
    submit(
        store,
        id_provider,
        time_provider,
        jobkeeper_core::application::lifecycle::submit::SubmitRequest {
            job_type: job_type.to_string(),
            payload: serde_json::json!({}),
            priority,
            max_attempts: 3,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn higher_priority_is_announced_before_lower_priority() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let store = SqliteJobStore::new(pool);
    let hint = InProcessReadyQueueHint::new();
    let time_provider = SystemTimeProvider;
    let id_provider = UuidIdProvider;

    let low = submit_job(&store, &id_provider, &time_provider, "low", 1).await;
    let high = submit_job(&store, &id_provider, &time_provider, "high", 10).await;
    let mid = submit_job(&store, &id_provider, &time_provider, "mid", 5).await;

    let pushed = requeue_ready(&store, &hint, &time_provider, 100).await.unwrap();
    assert_eq!(pushed, 3);

    assert_eq!(hint.pop().await.as_deref(), Some(high.id.as_str()));
    assert_eq!(hint.pop().await.as_deref(), Some(mid.id.as_str()));
    assert_eq!(hint.pop().await.as_deref(), Some(low.id.as_str()));
}

#[tokio::test]
async fn equal_priority_jobs_are_announced_oldest_first() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let store = SqliteJobStore::new(pool);
    let hint = InProcessReadyQueueHint::new();
    let time_provider = SystemTimeProvider;
    let id_provider = UuidIdProvider;

    let first_submitted = submit_job(&store, &id_provider, &time_provider, "a", 5).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second_submitted = submit_job(&store, &id_provider, &time_provider, "b", 5).await;

    let pushed = requeue_ready(&store, &hint, &time_provider, 100).await.unwrap();
    assert_eq!(pushed, 2);

    assert_eq!(hint.pop().await.as_deref(), Some(first_submitted.id.as_str()));
    assert_eq!(hint.pop().await.as_deref(), Some(second_submitted.id.as_str()));
}
