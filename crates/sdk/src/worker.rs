//! Worker - Client-Side Job Execution Loop
//!
//! Running a job's payload is the caller's concern, not the daemon's: the
//! daemon only keeps the `lease -> start -> complete/fail` ledger honest.
//! `Worker` is the reference poll loop a binary embeds to actually do the
//! work, built on the lease-then-start two-phase protocol from the RPC
//! surface.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::client::JobkeeperClient;
use crate::error::Result;
pub use crate::shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
use crate::types::{JobDto, ListRequest, SubmitRequest};

const IDLE_SLEEP: Duration = Duration::from_millis(500);
const ERROR_RECOVERY_SLEEP: Duration = Duration::from_secs(2);
const RECONCILE_INTERVAL: Duration = Duration::from_secs(30);
const LIST_CANDIDATES_LIMIT: i64 = 20;

/// A job handler: takes the leased job, returns `Ok(())` on success or
/// `Err(message)` on failure (fed into `jobs.fail.v1`'s `error` field).
pub type JobHandler =
    Arc<dyn Fn(JobDto) -> BoxFuture<'static, std::result::Result<(), String>> + Send + Sync>;

/// Wraps an async closure into a `JobHandler`.
pub fn handler<F, Fut>(f: F) -> JobHandler
where
    F: Fn(JobDto) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<(), String>> + Send + 'static,
{
    Arc::new(move |job| Box::pin(f(job)) as Pin<Box<dyn Future<Output = _> + Send>>)
}

pub struct Worker {
    client: Arc<JobkeeperClient>,
    worker_id: String,
    lease_seconds: i64,
    handler: JobHandler,
}

impl Worker {
    pub fn new(
        client: Arc<JobkeeperClient>,
        worker_id: impl Into<String>,
        lease_seconds: i64,
        handler: JobHandler,
    ) -> Self {
        Self {
            client,
            worker_id: worker_id.into(),
            lease_seconds,
            handler,
        }
    }

    /// Submit a job through this worker's client. A thin convenience so a
    /// single `JobkeeperClient` can be shared between submitters and workers.
    pub async fn submit(&self, request: SubmitRequest) -> Result<JobDto> {
        Ok(self.client.submit(request).await?.job)
    }

    /// Run the poll loop until `shutdown` fires.
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(worker_id = %self.worker_id, "worker started");
        let mut reconcile_tick = tokio::time::interval(RECONCILE_INTERVAL);
        reconcile_tick.tick().await; // first tick fires immediately, skip it

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            match self.process_next_job().await {
                Ok(true) => {}
                Ok(false) => {
                    tokio::select! {
                        _ = sleep(IDLE_SLEEP) => {},
                        _ = reconcile_tick.tick() => self.run_reconcile().await,
                        _ = shutdown.wait() => break,
                    }
                }
                Err(e) => {
                    error!(worker_id = %self.worker_id, error = %e, "worker poll error");
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP) => {},
                        _ = shutdown.wait() => break,
                    }
                }
            }
        }
        info!(worker_id = %self.worker_id, "worker stopped");
        Ok(())
    }

    /// Periodic reconcile call so the system keeps progressing even while
    /// this worker has nothing to lease.
    async fn run_reconcile(&self) {
        match self.client.reconcile(LIST_CANDIDATES_LIMIT).await {
            Ok(outcome) if outcome.recovered > 0 || outcome.dead > 0 || outcome.requeued > 0 => {
                info!(
                    worker_id = %self.worker_id,
                    recovered = outcome.recovered,
                    dead = outcome.dead,
                    requeued = outcome.requeued,
                    "worker-driven reconcile"
                );
            }
            Ok(_) => {}
            Err(e) => warn!(worker_id = %self.worker_id, error = %e, "worker-driven reconcile failed"),
        }
    }

    /// Find a queued job, lease it, start and run it. Returns `Ok(false)`
    /// if nothing was leaseable (either no candidates, or every candidate
    /// lost the race to another worker).
    async fn process_next_job(&self) -> Result<bool> {
        let job = match self.lease_a_candidate().await? {
            Some(job) => job,
            None => return Ok(false),
        };

        let started = match self.client.start(job.id.clone(), self.worker_id.clone()).await {
            Ok(resp) => resp.job,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "lease lost before start, skipping");
                return Ok(false);
            }
        };

        info!(job_id = %started.id, job_type = %started.job_type, "executing job");

        let handler = self.handler.clone();
        let job_for_exec = started.clone();
        let execution = tokio::spawn(async move { handler(job_for_exec).await });

        match execution.await {
            Ok(Ok(())) => {
                self.client
                    .complete(started.id.clone(), self.worker_id.clone())
                    .await?;
                info!(job_id = %started.id, "job completed");
            }
            Ok(Err(msg)) => {
                warn!(job_id = %started.id, error = %msg, "job failed");
                self.client
                    .fail(started.id.clone(), self.worker_id.clone(), msg)
                    .await?;
            }
            Err(join_err) => {
                let msg = if join_err.is_panic() {
                    format!("job handler panicked: {join_err}")
                } else {
                    format!("job handler cancelled: {join_err}")
                };
                error!(job_id = %started.id, error = %msg, "job execution did not return");
                self.client
                    .fail(started.id.clone(), self.worker_id.clone(), msg)
                    .await?;
            }
        }

        Ok(true)
    }

    /// Lists queued jobs (already ordered priority desc, created_at asc by
    /// the daemon) and tries to lease each in turn until one succeeds or
    /// the candidate list is exhausted.
    async fn lease_a_candidate(&self) -> Result<Option<JobDto>> {
        let candidates = self
            .client
            .list(ListRequest {
                status: Some("QUEUED".to_string()),
                job_type: None,
                limit: LIST_CANDIDATES_LIMIT,
                offset: 0,
            })
            .await?
            .jobs;

        for candidate in candidates {
            match self
                .client
                .lease(candidate.id.clone(), self.worker_id.clone(), self.lease_seconds)
                .await
            {
                Ok(resp) => return Ok(Some(resp.job)),
                Err(e) => {
                    warn!(job_id = %candidate.id, error = %e, "lost race leasing candidate, trying next");
                }
            }
        }

        Ok(None)
    }
}
