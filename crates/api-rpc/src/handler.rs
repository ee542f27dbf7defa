//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method by delegating
//! to `jobkeeper_core::application::lifecycle`.

use std::sync::Arc;

use jsonrpsee::types::ErrorObjectOwned;

use jobkeeper_core::application::lifecycle::{
    complete, fail, get, lease, list, reconcile, requeue_ready, start, submit,
};
use jobkeeper_core::application::RetryPolicy;
use jobkeeper_core::port::{IdProvider, JobListFilter, JobStore, ReadyQueueHint, TimeProvider};

use crate::error::{code, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    CompleteRequest, CompleteResponse, FailRequest, FailResponse, HealthRequest, HealthResponse,
    JobDto, LeaseRequest, LeaseResponse, ListRequest, ListResponse, ReconcileRequest,
    ReconcileResponse, RequeueReadyRequest, RequeueReadyResponse, StartRequest, StartResponse,
    SubmitRequest, SubmitResponse,
};

pub struct RpcHandler {
    store: Arc<dyn JobStore>,
    hint: Arc<dyn ReadyQueueHint>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    retry_policy: RetryPolicy,
    rate_limiter: RateLimiter,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(
        store: Arc<dyn JobStore>,
        hint: Arc<dyn ReadyQueueHint>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        retry_policy: RetryPolicy,
    ) -> Self {
        let max_burst: u32 = std::env::var("JOBKEEPER_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);

        let rate_per_sec: u32 = std::env::var("JOBKEEPER_RATE_LIMIT_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Self {
            store,
            hint,
            id_provider,
            time_provider,
            retry_policy,
            rate_limiter: RateLimiter::new(max_burst, rate_per_sec),
            start_time: std::time::Instant::now(),
        }
    }

    async fn throttle(&self) -> Result<(), ErrorObjectOwned> {
        if self.rate_limiter.check().await {
            Ok(())
        } else {
            Err(ErrorObjectOwned::owned(
                code::THROTTLED,
                "rate limit exceeded, please slow down",
                None::<()>,
            ))
        }
    }

    pub async fn health(&self, _params: HealthRequest) -> Result<HealthResponse, ErrorObjectOwned> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            version: jobkeeper_core::VERSION.to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }

    pub async fn submit(&self, params: SubmitRequest) -> Result<SubmitResponse, ErrorObjectOwned> {
        self.throttle().await?;

        let job = submit(
            self.store.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            jobkeeper_core::application::lifecycle::submit::SubmitRequest {
                job_type: params.job_type,
                payload: params.payload,
                priority: params.priority,
                max_attempts: params.max_attempts,
            },
        )
        .await
        .map_err(to_rpc_error)?;

        self.hint.push(job.id.clone()).await;

        Ok(SubmitResponse { job: job.into() })
    }

    pub async fn list(&self, params: ListRequest) -> Result<ListResponse, ErrorObjectOwned> {
        let status = params
            .status
            .as_deref()
            .map(|s| s.parse())
            .transpose()
            .map_err(|e| to_rpc_error(jobkeeper_core::error::AppError::Domain(e)))?;

        let filter = JobListFilter {
            status,
            job_type: params
                .job_type
                .map(jobkeeper_core::domain::JobType::new),
            limit: params.limit,
            offset: params.offset,
        };

        let jobs = list(self.store.as_ref(), &filter).await.map_err(to_rpc_error)?;

        Ok(ListResponse {
            jobs: jobs.into_iter().map(JobDto::from).collect(),
        })
    }

    pub async fn lease(&self, params: LeaseRequest) -> Result<LeaseResponse, ErrorObjectOwned> {
        self.throttle().await?;

        let job = lease(
            self.store.as_ref(),
            self.time_provider.as_ref(),
            &params.job_id,
            &params.worker_id,
            params.lease_seconds,
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(LeaseResponse { job: job.into() })
    }

    pub async fn start(&self, params: StartRequest) -> Result<StartResponse, ErrorObjectOwned> {
        self.throttle().await?;

        let job = start(
            self.store.as_ref(),
            self.time_provider.as_ref(),
            &params.job_id,
            &params.worker_id,
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(StartResponse { job: job.into() })
    }

    pub async fn complete(&self, params: CompleteRequest) -> Result<CompleteResponse, ErrorObjectOwned> {
        self.throttle().await?;

        let job = complete(
            self.store.as_ref(),
            self.time_provider.as_ref(),
            &params.job_id,
            &params.worker_id,
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(CompleteResponse { job: job.into() })
    }

    pub async fn fail(&self, params: FailRequest) -> Result<FailResponse, ErrorObjectOwned> {
        self.throttle().await?;

        let job = fail(
            self.store.as_ref(),
            self.time_provider.as_ref(),
            &self.retry_policy,
            &params.job_id,
            &params.worker_id,
            &params.error,
        )
        .await
        .map_err(to_rpc_error)?;

        if job.status == jobkeeper_core::domain::JobStatus::Queued {
            self.hint.push(job.id.clone()).await;
        }

        Ok(FailResponse { job: job.into() })
    }

    pub async fn requeue_ready(
        &self,
        params: RequeueReadyRequest,
    ) -> Result<RequeueReadyResponse, ErrorObjectOwned> {
        let requeued = requeue_ready(
            self.store.as_ref(),
            self.hint.as_ref(),
            self.time_provider.as_ref(),
            params.limit,
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(RequeueReadyResponse { requeued })
    }

    pub async fn reconcile(&self, params: ReconcileRequest) -> Result<ReconcileResponse, ErrorObjectOwned> {
        let outcome = reconcile(
            self.store.as_ref(),
            self.hint.as_ref(),
            self.time_provider.as_ref(),
            params.limit,
        )
        .await
        .map_err(to_rpc_error)?;

        Ok(ReconcileResponse {
            recovered: outcome.recovered,
            dead: outcome.dead,
            requeued: outcome.requeued,
        })
    }

    /// Read-only lookup used by integration tests and the CLI's `get` command.
    pub async fn get(&self, job_id: &str) -> Result<JobDto, ErrorObjectOwned> {
        let job = get(self.store.as_ref(), &job_id.to_string())
            .await
            .map_err(to_rpc_error)?;
        Ok(job.into())
    }
}
