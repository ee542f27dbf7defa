//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC wire types from `jobkeeper-api-rpc`. Kept as a
//! separate copy (rather than depending on api-rpc directly) so SDK
//! consumers don't pull in a JSON-RPC server implementation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
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

#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    pub job_type: String,
    pub payload: serde_json::Value,
    pub priority: i32,
    pub max_attempts: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub job: JobDto,
}

#[derive(Debug, Clone, Default, Serialize)]
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

#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    pub jobs: Vec<JobDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaseRequest {
    pub job_id: String,
    pub worker_id: String,
    pub lease_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaseResponse {
    pub job: JobDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub job_id: String,
    pub worker_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub job: JobDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteRequest {
    pub job_id: String,
    pub worker_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteResponse {
    pub job: JobDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailRequest {
    pub job_id: String,
    pub worker_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FailResponse {
    pub job: JobDto,
}

fn default_sweep_limit() -> i64 {
    100
}

#[derive(Debug, Clone, Serialize)]
pub struct RequeueReadyRequest {
    #[serde(default = "default_sweep_limit")]
    pub limit: i64,
}

impl Default for RequeueReadyRequest {
    fn default() -> Self {
        Self {
            limit: default_sweep_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequeueReadyResponse {
    pub requeued: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileRequest {
    #[serde(default = "default_sweep_limit")]
    pub limit: i64,
}

impl Default for ReconcileRequest {
    fn default() -> Self {
        Self {
            limit: default_sweep_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileResponse {
    pub recovered: usize,
    pub dead: usize,
    pub requeued: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthRequest {}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}
