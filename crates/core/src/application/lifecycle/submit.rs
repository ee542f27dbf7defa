// Submit Use Case

use serde::{Deserialize, Serialize};

use crate::application::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PRIORITY};
use crate::application::validation::{validate_job_type, validate_max_attempts, validate_payload_depth, validate_priority};
use crate::domain::{Job, JobPayload, JobType};
use crate::error::Result;
use crate::port::{IdProvider, JobStore, TimeProvider};

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_max_attempts() -> i32 {
    DEFAULT_MAX_ATTEMPTS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub job_type: String,
    pub payload: serde_json::Value,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

pub async fn execute(
    store: &dyn JobStore,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: SubmitRequest,
) -> Result<Job> {
    validate_job_type(&req.job_type)?;
    validate_priority(req.priority)?;
    validate_max_attempts(req.max_attempts)?;
    validate_payload_depth(&req.payload)?;

    let id = id_provider.new_id();
    let now = time_provider.now_millis();

    let job = Job::new(
        id,
        now,
        JobType::new(req.job_type),
        Some(JobPayload::new(req.payload)),
        req.priority,
        req.max_attempts,
    );

    store.insert(job).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::time_provider::mocks::MockTimeProvider;

    #[tokio::test]
    async fn submits_a_queued_job() {
        let store = InMemoryJobStore::new();
        let ids = SequentialIdProvider::new();
        let clock = MockTimeProvider::new(1_000);

        let job = execute(
            &store,
            &ids,
            &clock,
            SubmitRequest {
                job_type: "send_email".into(),
                payload: serde_json::json!({"to": "a@example.com"}),
                priority: 5,
                max_attempts: 3,
            },
        )
        .await
        .unwrap();

        assert_eq!(job.status, crate::domain::JobStatus::Queued);
        assert_eq!(job.attempts, 0);
        assert_eq!(job.created_at, 1_000);

        let filter = crate::port::JobListFilter::new();
        assert_eq!(store.list(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_priority() {
        let store = InMemoryJobStore::new();
        let ids = SequentialIdProvider::new();
        let clock = MockTimeProvider::new(1_000);

        let result = execute(
            &store,
            &ids,
            &clock,
            SubmitRequest {
                job_type: "send_email".into(),
                payload: serde_json::json!({}),
                priority: 9999,
                max_attempts: 3,
            },
        )
        .await;

        assert!(result.is_err());
    }
}
