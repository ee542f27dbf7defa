// Job Store Port
//
// The store is the sole authority over job state: the application layer
// holds no in-memory copy of a job between calls. Every transition is
// expressed as a single conditional statement (CAS) so that two workers
// racing the same row can never both win — the loser observes `Ok(None)`
// and must re-poll rather than retry blindly.

use async_trait::async_trait;

use crate::domain::{Job, JobId, JobStatus, JobType, WorkerId};
use crate::error::Result;

/// Filter for `JobStore::list`. `None` fields are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct JobListFilter {
    pub status: Option<JobStatus>,
    pub job_type: Option<JobType>,
    pub limit: i64,
    pub offset: i64,
}

impl JobListFilter {
    pub fn new() -> Self {
        Self {
            status: None,
            job_type: None,
            limit: 100,
            offset: 0,
        }
    }
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a freshly submitted job. The row does not yet exist.
    async fn insert(&self, job: Job) -> Result<Job>;

    async fn get(&self, id: &JobId) -> Result<Option<Job>>;

    async fn list(&self, filter: &JobListFilter) -> Result<Vec<Job>>;

    /// Atomically grant a lease on `id`, conditioned on it currently being
    /// leaseable: `status = queued`, `next_run_at` either unset or already
    /// due, and no live lease held by anyone else. Sets locked_by /
    /// lock_expires_at but leaves status at queued — `start` is the
    /// transition that moves it to running. `Ok(None)` means the
    /// precondition did not hold (already leased, not queued, or not yet
    /// due) — the caller observes this as a conflict, never retried here.
    async fn lease(
        &self,
        id: &JobId,
        worker_id: &WorkerId,
        lease_ms: i64,
        now_millis: i64,
    ) -> Result<Option<Job>>;

    /// queued -> running, conditioned on the caller holding the live lease.
    /// `Ok(None)` means the precondition did not hold (lease expired, lease
    /// held by someone else, or the job was not in the expected state).
    async fn start(&self, id: &JobId, worker_id: &WorkerId, now_millis: i64) -> Result<Option<Job>>;

    /// running -> completed, conditioned on the caller holding the live lease.
    async fn complete(
        &self,
        id: &JobId,
        worker_id: &WorkerId,
        now_millis: i64,
    ) -> Result<Option<Job>>;

    /// running -> queued (retry, with `next_run_at` backoff) or running ->
    /// dead (attempts exhausted), conditioned on the caller holding the live
    /// lease. The store decides queued vs. dead by comparing attempts against
    /// max_attempts; the caller supplies only the backoff target.
    async fn fail(
        &self,
        id: &JobId,
        worker_id: &WorkerId,
        error: &str,
        next_run_at: i64,
        now_millis: i64,
    ) -> Result<Option<Job>>;

    /// Sweep up to `limit` running jobs whose lease has expired (crashed or
    /// wedged workers) back to queued (applying the same backoff table as
    /// `fail`), or to dead if attempts are exhausted. Each row is mutated
    /// via its own conditional single-row update, so a concurrent worker
    /// report (`complete`/`fail`) racing the sweep can never be clobbered.
    /// Returns every job the sweep actually touched.
    async fn reconcile_expired_leases(&self, limit: i64, now_millis: i64) -> Result<Vec<Job>>;
}

#[cfg(test)]
pub mod mocks {
    use super::{JobListFilter, JobStore};
    use crate::application::backoff::{RetryDecision, RetryPolicy};
    use crate::domain::{Job, JobId, JobStatus, WorkerId};
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// A single-process, mutex-guarded store with the same CAS semantics
    /// a real backend must provide. Good enough to exercise the lifecycle
    /// use cases without a database.
    pub struct InMemoryJobStore {
        jobs: Mutex<Vec<Job>>,
    }

    impl InMemoryJobStore {
        pub fn new() -> Self {
            Self {
                jobs: Mutex::new(Vec::new()),
            }
        }

        pub fn seed(&self, job: Job) {
            self.jobs.lock().unwrap().push(job);
        }
    }

    impl Default for InMemoryJobStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl JobStore for InMemoryJobStore {
        async fn insert(&self, job: Job) -> Result<Job> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(job)
        }

        async fn get(&self, id: &JobId) -> Result<Option<Job>> {
            Ok(self.jobs.lock().unwrap().iter().find(|j| &j.id == id).cloned())
        }

        async fn list(&self, filter: &JobListFilter) -> Result<Vec<Job>> {
            let jobs = self.jobs.lock().unwrap();
            let mut matched: Vec<Job> = jobs
                .iter()
                .filter(|j| filter.status.map(|s| s == j.status).unwrap_or(true))
                .filter(|j| {
                    filter
                        .job_type
                        .as_ref()
                        .map(|t| t == &j.job_type)
                        .unwrap_or(true)
                })
                .cloned()
                .collect();
            matched.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.id.cmp(&b.id))
            });
            let offset = filter.offset.max(0) as usize;
            let limit = filter.limit.max(0) as usize;
            Ok(matched.into_iter().skip(offset).take(limit).collect())
        }

        async fn lease(
            &self,
            id: &JobId,
            worker_id: &WorkerId,
            lease_ms: i64,
            now_millis: i64,
        ) -> Result<Option<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(job) = jobs.iter_mut().find(|j| &j.id == id) {
                if job.is_leaseable(now_millis) {
                    job.locked_by = Some(worker_id.clone());
                    job.lock_expires_at = Some(now_millis + lease_ms);
                    job.updated_at = now_millis;
                    return Ok(Some(job.clone()));
                }
            }
            Ok(None)
        }

        async fn start(
            &self,
            id: &JobId,
            worker_id: &WorkerId,
            now_millis: i64,
        ) -> Result<Option<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(job) = jobs.iter_mut().find(|j| &j.id == id) {
                if job.status == JobStatus::Queued && job.has_valid_lease(now_millis)
                    && job.locked_by.as_ref() == Some(worker_id)
                {
                    job.status = JobStatus::Running;
                    if job.started_at.is_none() {
                        job.started_at = Some(now_millis);
                    }
                    job.next_run_at = None;
                    job.updated_at = now_millis;
                    return Ok(Some(job.clone()));
                }
            }
            Ok(None)
        }

        async fn complete(
            &self,
            id: &JobId,
            worker_id: &WorkerId,
            now_millis: i64,
        ) -> Result<Option<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(job) = jobs.iter_mut().find(|j| &j.id == id) {
                if job.status == JobStatus::Running && job.locked_by.as_ref() == Some(worker_id) {
                    job.status = JobStatus::Completed;
                    job.completed_at = Some(now_millis);
                    job.updated_at = now_millis;
                    job.locked_by = None;
                    job.lock_expires_at = None;
                    return Ok(Some(job.clone()));
                }
            }
            Ok(None)
        }

        async fn fail(
            &self,
            id: &JobId,
            worker_id: &WorkerId,
            error: &str,
            next_run_at: i64,
            now_millis: i64,
        ) -> Result<Option<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(job) = jobs.iter_mut().find(|j| &j.id == id) {
                if job.status == JobStatus::Running && job.locked_by.as_ref() == Some(worker_id) {
                    job.attempts += 1;
                    job.last_error = Some(error.to_string());
                    job.locked_by = None;
                    job.lock_expires_at = None;
                    job.updated_at = now_millis;
                    if job.attempts >= job.max_attempts {
                        job.status = JobStatus::Dead;
                    } else {
                        job.status = JobStatus::Queued;
                        job.next_run_at = Some(next_run_at);
                    }
                    return Ok(Some(job.clone()));
                }
            }
            Ok(None)
        }

        async fn reconcile_expired_leases(&self, limit: i64, now_millis: i64) -> Result<Vec<Job>> {
            let policy = RetryPolicy::new();
            let mut jobs = self.jobs.lock().unwrap();
            let mut candidate_ids: Vec<JobId> = jobs
                .iter()
                .filter(|j| {
                    j.status == JobStatus::Running
                        && j.lock_expires_at.map(|t| t <= now_millis).unwrap_or(false)
                })
                .map(|j| j.id.clone())
                .collect();
            candidate_ids.sort();
            candidate_ids.truncate(limit.max(0) as usize);

            let mut swept = Vec::new();
            for id in candidate_ids {
                if let Some(job) = jobs.iter_mut().find(|j| j.id == id) {
                    job.attempts += 1;
                    job.locked_by = None;
                    job.lock_expires_at = None;
                    job.updated_at = now_millis;
                    job.last_error = Some("lease expired".to_string());
                    match policy.decide(job.attempts, job.max_attempts, now_millis) {
                        RetryDecision::Retry { next_run_at } => {
                            job.status = JobStatus::Queued;
                            job.next_run_at = Some(next_run_at);
                        }
                        RetryDecision::Exhausted => {
                            job.status = JobStatus::Dead;
                        }
                    }
                    swept.push(job.clone());
                }
            }
            Ok(swept)
        }
    }
}
