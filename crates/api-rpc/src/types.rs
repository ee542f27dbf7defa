//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results. Request/response
//! shapes are kept separate from the domain `Job` type so the wire
//! contract can stay stable independent of internal refactors.

use serde::{Deserialize, Serialize};

use jobkeeper_core::application::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PRIORITY};
use jobkeeper_core::domain::Job;

/// Wire representation of a job. A thin, explicit mirror of the domain
/// entity rather than a re-export, so adding an internal-only field to
/// `Job` doesn't silently change the API contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDto {
    pub id: String,
    pub job_type: String,
    pub payload: Option<serde_json::Value>,
    pub priority: i32,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub next_run_at: Option<i64>,
    pub locked_by: Option<String>,
    pub lock_expires_at: Option<i64>,
}

impl From<Job> for JobDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            job_type: job.job_type.as_str().to_string(),
            payload: job.payload.map(|p| p.as_value().clone()),
            priority: job.priority,
            status: job.status.to_string(),
            attempts: job.attempts,
            max_attempts: job.max_attempts,
            last_error: job.last_error,
            created_at: job.created_at,
            updated_at: job.updated_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            next_run_at: job.next_run_at,
            locked_by: job.locked_by,
            lock_expires_at: job.lock_expires_at,
        }
    }
}

/// jobs.health.v1
#[derive(Debug, Deserialize)]
pub struct HealthRequest {}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_max_attempts() -> i32 {
    DEFAULT_MAX_ATTEMPTS
}

/// jobs.submit.v1
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub job_type: String,
    pub payload: serde_json::Value,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub job: JobDto,
}

/// jobs.list.v1
#[derive(Debug, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub jobs: Vec<JobDto>,
}

/// jobs.lease.v1
#[derive(Debug, Deserialize)]
pub struct LeaseRequest {
    pub job_id: String,
    pub worker_id: String,
    pub lease_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaseResponse {
    pub job: JobDto,
}

/// jobs.start.v1
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub job_id: String,
    pub worker_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub job: JobDto,
}

/// jobs.complete.v1
#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub job_id: String,
    pub worker_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteResponse {
    pub job: JobDto,
}

/// jobs.fail.v1
#[derive(Debug, Deserialize)]
pub struct FailRequest {
    pub job_id: String,
    pub worker_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailResponse {
    pub job: JobDto,
}

fn default_sweep_limit() -> i64 {
    100
}

/// jobs.requeue_ready.v1
#[derive(Debug, Deserialize)]
pub struct RequeueReadyRequest {
    #[serde(default = "default_sweep_limit")]
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequeueReadyResponse {
    pub requeued: usize,
}

/// jobs.reconcile.v1
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    #[serde(default = "default_sweep_limit")]
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResponse {
    pub recovered: usize,
    pub dead: usize,
    pub requeued: usize,
}
