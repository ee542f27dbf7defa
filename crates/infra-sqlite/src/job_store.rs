// SQLite JobStore Implementation
//
// Every transition is a single `UPDATE ... WHERE <precondition> RETURNING *`
// statement. SQLite serializes writers, so the precondition in the WHERE
// clause is the entire concurrency story: if it doesn't match, the
// statement updates zero rows and `RETURNING` yields nothing — the caller
// sees `Ok(None)` rather than a torn read-then-write.

use async_trait::async_trait;
use sqlx::SqlitePool;

use jobkeeper_core::domain::{Job, JobId, JobPayload, JobStatus, JobType, WorkerId};
use jobkeeper_core::error::{AppError, Result};
use jobkeeper_core::port::{JobListFilter, JobStore};

fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "5" => AppError::Database(format!("database locked (SQLITE_BUSY): {}", db_err.message())),
                    "13" => AppError::Database(format!("database full: {}", db_err.message())),
                    other => AppError::Database(format!("database error [{other}]: {}", db_err.message())),
                }
            } else {
                AppError::Database(format!("database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("row not found".into()),
        other => AppError::Database(other.to_string()),
    }
}

pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    job_type: String,
    payload: Option<String>,
    priority: i32,
    status: String,
    attempts: i32,
    max_attempts: i32,
    last_error: Option<String>,
    created_at: i64,
    updated_at: i64,
    started_at: Option<i64>,
    completed_at: Option<i64>,
    next_run_at: Option<i64>,
    locked_by: Option<String>,
    lock_expires_at: Option<i64>,
}

impl JobRow {
    fn into_job(self) -> Result<Job> {
        let status: JobStatus = self.status.parse().map_err(AppError::Domain)?;
        let payload = match self.payload {
            Some(raw) => Some(JobPayload::new(serde_json::from_str(&raw)?)),
            None => None,
        };

        Ok(Job {
            id: self.id,
            job_type: JobType::new(self.job_type),
            payload,
            priority: self.priority,
            status,
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            last_error: self.last_error,
            created_at: self.created_at,
            updated_at: self.updated_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            next_run_at: self.next_run_at,
            locked_by: self.locked_by,
            lock_expires_at: self.lock_expires_at,
        })
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, job: Job) -> Result<Job> {
        let payload_str = job.payload.as_ref().map(|p| p.as_value().to_string());

        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, job_type, payload, priority, status,
                attempts, max_attempts, last_error,
                created_at, updated_at, started_at, completed_at, next_run_at,
                locked_by, lock_expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(job.job_type.as_str())
        .bind(&payload_str)
        .bind(job.priority)
        .bind(job.status.to_string())
        .bind(job.attempts)
        .bind(job.max_attempts)
        .bind(&job.last_error)
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.next_run_at)
        .bind(&job.locked_by)
        .bind(job.lock_expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(job)
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn list(&self, filter: &JobListFilter) -> Result<Vec<Job>> {
        let status_str = filter.status.map(|s| s.to_string());
        let job_type_str = filter.job_type.as_ref().map(|t| t.as_str().to_string());

        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT * FROM jobs
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR job_type = ?2)
            ORDER BY priority DESC, created_at ASC, id ASC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(status_str)
        .bind(job_type_str)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }

    async fn lease(
        &self,
        id: &JobId,
        worker_id: &WorkerId,
        lease_ms: i64,
        now_millis: i64,
    ) -> Result<Option<Job>> {
        let lock_expires_at = now_millis + lease_ms;

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET locked_by = ?, lock_expires_at = ?, updated_at = ?
            WHERE id = ?
              AND status = 'QUEUED'
              AND (next_run_at IS NULL OR next_run_at <= ?)
              AND (lock_expires_at IS NULL OR lock_expires_at <= ?)
            RETURNING *
            "#,
        )
        .bind(worker_id)
        .bind(lock_expires_at)
        .bind(now_millis)
        .bind(id)
        .bind(now_millis)
        .bind(now_millis)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn start(&self, id: &JobId, worker_id: &WorkerId, now_millis: i64) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = 'RUNNING',
                started_at = COALESCE(started_at, ?),
                next_run_at = NULL,
                updated_at = ?
            WHERE id = ?
              AND status = 'QUEUED'
              AND locked_by = ?
              AND lock_expires_at > ?
              AND (next_run_at IS NULL OR next_run_at <= ?)
            RETURNING *
            "#,
        )
        .bind(now_millis)
        .bind(now_millis)
        .bind(id)
        .bind(worker_id)
        .bind(now_millis)
        .bind(now_millis)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn complete(
        &self,
        id: &JobId,
        worker_id: &WorkerId,
        now_millis: i64,
    ) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = 'COMPLETED', completed_at = ?, updated_at = ?,
                locked_by = NULL, lock_expires_at = NULL
            WHERE id = ? AND status = 'RUNNING' AND locked_by = ?
            RETURNING *
            "#,
        )
        .bind(now_millis)
        .bind(now_millis)
        .bind(id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn fail(
        &self,
        id: &JobId,
        worker_id: &WorkerId,
        error: &str,
        next_run_at: i64,
        now_millis: i64,
    ) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET attempts = attempts + 1,
                last_error = ?,
                locked_by = NULL,
                lock_expires_at = NULL,
                updated_at = ?,
                status = CASE WHEN attempts + 1 >= max_attempts THEN 'DEAD' ELSE 'QUEUED' END,
                next_run_at = CASE WHEN attempts + 1 >= max_attempts THEN next_run_at ELSE ? END
            WHERE id = ? AND status = 'RUNNING' AND locked_by = ?
            RETURNING *
            "#,
        )
        .bind(error)
        .bind(now_millis)
        .bind(next_run_at)
        .bind(id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn reconcile_expired_leases(&self, limit: i64, now_millis: i64) -> Result<Vec<Job>> {
        // SQLite's UPDATE has no portable LIMIT, so the bound is applied by
        // first selecting candidate ids and then mutating each with its own
        // single-row conditional UPDATE. A concurrent `complete`/`fail` for
        // the same id simply loses the CAS (status no longer 'RUNNING') and
        // the row is silently skipped here rather than double-counted.
        let candidate_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM jobs
            WHERE status = 'RUNNING' AND lock_expires_at IS NOT NULL AND lock_expires_at <= ?
            ORDER BY lock_expires_at ASC
            LIMIT ?
            "#,
        )
        .bind(now_millis)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut swept = Vec::with_capacity(candidate_ids.len());
        for id in candidate_ids {
            let row = sqlx::query_as::<_, JobRow>(
                r#"
                UPDATE jobs
                SET attempts = attempts + 1,
                    locked_by = NULL,
                    lock_expires_at = NULL,
                    updated_at = ?,
                    last_error = 'lease expired',
                    status = CASE WHEN attempts + 1 >= max_attempts THEN 'DEAD' ELSE 'QUEUED' END,
                    next_run_at = CASE
                        WHEN attempts + 1 >= max_attempts THEN next_run_at
                        WHEN attempts + 1 <= 1 THEN ? + 10000
                        WHEN attempts + 1 = 2 THEN ? + 30000
                        WHEN attempts + 1 = 3 THEN ? + 90000
                        ELSE ? + 300000
                    END
                WHERE id = ? AND status = 'RUNNING' AND lock_expires_at IS NOT NULL AND lock_expires_at <= ?
                RETURNING *
                "#,
            )
            .bind(now_millis)
            .bind(now_millis)
            .bind(now_millis)
            .bind(now_millis)
            .bind(now_millis)
            .bind(&id)
            .bind(now_millis)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            if let Some(row) = row {
                swept.push(row.into_job()?);
            }
        }

        Ok(swept)
    }
}
