// Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (UUID v4, string-shaped per the wire contract)
pub type JobId = String;

/// Worker identifier (opaque, supplied by the caller of `lease`)
pub type WorkerId = String;

/// Priority: higher runs earlier, ties break by created_at ascending
pub type Priority = i32;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Dead,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "QUEUED"),
            JobStatus::Running => write!(f, "RUNNING"),
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Dead => write!(f, "DEAD"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = crate::domain::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(JobStatus::Queued),
            "RUNNING" => Ok(JobStatus::Running),
            "COMPLETED" => Ok(JobStatus::Completed),
            "DEAD" => Ok(JobStatus::Dead),
            other => Err(crate::domain::error::DomainError::Internal(format!(
                "unrecognized job status in storage: {other}"
            ))),
        }
    }
}

/// Job type (dispatch label for workers). Opaque to the engine beyond
/// non-emptiness, validated at submission (ADR-040 style bound).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobType(String);

impl JobType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Job payload, opaque structured data owned by the submitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPayload(serde_json::Value);

impl JobPayload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Job entity. Field-for-field the attribute table of the data model:
/// id, type, payload, priority, status, attempts, max_attempts, last_error,
/// created_at, updated_at, started_at, completed_at, next_run_at,
/// locked_by, lock_expires_at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub job_type: JobType,
    pub payload: Option<JobPayload>,
    pub priority: Priority,
    pub status: JobStatus,

    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,

    pub created_at: i64, // epoch ms, immutable
    pub updated_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub next_run_at: Option<i64>,

    pub locked_by: Option<WorkerId>,
    pub lock_expires_at: Option<i64>,
}

impl Job {
    /// Create a freshly submitted job: state=queued, attempts=0, no lease.
    pub fn new(
        id: impl Into<String>,
        now_millis: i64,
        job_type: JobType,
        payload: Option<JobPayload>,
        priority: Priority,
        max_attempts: i32,
    ) -> Self {
        Self {
            id: id.into(),
            job_type,
            payload,
            priority,
            status: JobStatus::Queued,
            attempts: 0,
            max_attempts,
            last_error: None,
            created_at: now_millis,
            updated_at: now_millis,
            started_at: None,
            completed_at: None,
            next_run_at: None,
            locked_by: None,
            lock_expires_at: None,
        }
    }

    /// Create a deterministic test job (id/timestamps from a counter, not
    /// real time or randomness). Production code must inject both via
    /// ports. For tests only.
    pub fn new_test(job_type: JobType, payload: JobPayload) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let id = format!("test-{counter}");
        let created_at = (counter * 1000) as i64;

        Self::new(id, created_at, job_type, Some(payload), 5, 3)
    }

    pub fn is_leaseable(&self, now_millis: i64) -> bool {
        self.status == JobStatus::Queued
            && self.next_run_at.map(|t| t <= now_millis).unwrap_or(true)
            && self
                .lock_expires_at
                .map(|t| t <= now_millis)
                .unwrap_or(true)
    }

    pub fn has_valid_lease(&self, now_millis: i64) -> bool {
        self.locked_by.is_some() && self.lock_expires_at.map(|t| t > now_millis).unwrap_or(false)
    }
}
