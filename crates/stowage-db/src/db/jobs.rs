use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use stowage_core::models::{JobRecord, JobStatus, ThumbnailJob};
use stowage_core::AppError;
use uuid::Uuid;

/// Durable queue storage for thumbnail jobs.
///
/// Lifecycle: `pending -> running -> completed | failed`, with failed attempts
/// that can still be retried going back to `pending` at a later `run_at`.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn enqueue(&self, job: ThumbnailJob, max_retries: i32) -> Result<JobRecord, AppError>;

    /// Atomically claim the oldest due pending job and mark it running.
    async fn claim_next(&self) -> Result<Option<JobRecord>, AppError>;

    async fn mark_completed(&self, id: Uuid) -> Result<(), AppError>;

    /// Record a failed attempt and put the job back in the queue at `run_at`.
    async fn schedule_retry(
        &self,
        id: Uuid,
        error: &str,
        run_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Record a failed attempt and dead-letter the job.
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError>;

    /// Reap jobs stuck in `running` since before `stale_before`. The lost run
    /// counts as an attempt: jobs with retries left go back to pending, the
    /// rest are dead-lettered with [`STALE_JOB_ERROR`].
    async fn reap_stale(&self, stale_before: DateTime<Utc>) -> Result<ReapedJobs, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<JobRecord>, AppError>;

    async fn count_by_status(&self, status: JobStatus) -> Result<i64, AppError>;
}

/// `last_error` of a job whose worker vanished mid-run.
pub const STALE_JOB_ERROR: &str = "worker lost while running job";

/// Outcome of one [`JobStore::reap_stale`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapedJobs {
    pub requeued: u64,
    pub failed: u64,
}

impl ReapedJobs {
    pub fn total(&self) -> u64 {
        self.requeued + self.failed
    }
}

const JOB_COLUMNS: &str =
    "id, file_id, owner_id, status, attempts, max_retries, last_error, run_at, created_at, updated_at";

/// Postgres-backed job store; concurrent workers claim with `SKIP LOCKED`.
#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for JobRepository {
    #[tracing::instrument(skip(self), fields(db.table = "thumbnail_jobs", db.operation = "insert", file_id = %job.file_id))]
    async fn enqueue(&self, job: ThumbnailJob, max_retries: i32) -> Result<JobRecord, AppError> {
        let query = format!(
            r#"
            INSERT INTO thumbnail_jobs (id, file_id, owner_id, max_retries)
            VALUES ($1, $2, $3, $4)
            RETURNING {JOB_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<Postgres, JobRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(job.file_id)
            .bind(job.owner_id)
            .bind(max_retries)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "thumbnail_jobs", db.operation = "claim"))]
    async fn claim_next(&self) -> Result<Option<JobRecord>, AppError> {
        let query = format!(
            r#"
            UPDATE thumbnail_jobs SET status = 'running', updated_at = NOW()
            WHERE id = (
                SELECT id FROM thumbnail_jobs
                WHERE status = 'pending' AND run_at <= NOW()
                ORDER BY run_at ASC, created_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING {JOB_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<Postgres, JobRecord>(&query)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "thumbnail_jobs", db.operation = "update", db.record_id = %id))]
    async fn mark_completed(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE thumbnail_jobs
            SET status = 'completed', attempts = attempts + 1, last_error = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, error), fields(db.table = "thumbnail_jobs", db.operation = "update", db.record_id = %id))]
    async fn schedule_retry(
        &self,
        id: Uuid,
        error: &str,
        run_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE thumbnail_jobs
            SET status = 'pending', attempts = attempts + 1, last_error = $2, run_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(run_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, error), fields(db.table = "thumbnail_jobs", db.operation = "update", db.record_id = %id))]
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE thumbnail_jobs
            SET status = 'failed', attempts = attempts + 1, last_error = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "thumbnail_jobs", db.operation = "update"))]
    async fn reap_stale(&self, stale_before: DateTime<Utc>) -> Result<ReapedJobs, AppError> {
        // Right-hand sides see the pre-update row, so `attempts` is the old count.
        let statuses = sqlx::query_scalar::<Postgres, JobStatus>(
            r#"
            UPDATE thumbnail_jobs
            SET status = CASE WHEN attempts < max_retries
                    THEN 'pending'::job_status ELSE 'failed'::job_status END,
                attempts = attempts + 1,
                last_error = $2,
                run_at = NOW(),
                updated_at = NOW()
            WHERE status = 'running' AND updated_at < $1
            RETURNING status
            "#,
        )
        .bind(stale_before)
        .bind(STALE_JOB_ERROR)
        .fetch_all(&self.pool)
        .await?;

        Ok(statuses
            .into_iter()
            .fold(ReapedJobs::default(), |mut reaped, status| {
                if status == JobStatus::Failed {
                    reaped.failed += 1;
                } else {
                    reaped.requeued += 1;
                }
                reaped
            }))
    }

    #[tracing::instrument(skip(self), fields(db.table = "thumbnail_jobs", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<JobRecord>, AppError> {
        let query = format!("SELECT {JOB_COLUMNS} FROM thumbnail_jobs WHERE id = $1");
        let record = sqlx::query_as::<Postgres, JobRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM thumbnail_jobs WHERE status = $1",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
