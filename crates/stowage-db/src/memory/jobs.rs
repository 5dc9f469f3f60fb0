use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use stowage_core::models::{JobRecord, JobStatus, ThumbnailJob};
use stowage_core::AppError;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::jobs::{ReapedJobs, STALE_JOB_ERROR};
use crate::db::JobStore;

/// Job queue held in process memory. Claims are serialized by the mutex.
#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Arc<Mutex<Vec<JobRecord>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every job, in enqueue order.
    pub async fn all(&self) -> Vec<JobRecord> {
        self.jobs.lock().await.clone()
    }

    async fn update<F>(&self, id: Uuid, f: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut JobRecord) + Send,
    {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| AppError::NotFound(format!("job {id}")))?;
        f(job);
        job.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn enqueue(&self, job: ThumbnailJob, max_retries: i32) -> Result<JobRecord, AppError> {
        let now = Utc::now();
        let record = JobRecord {
            id: Uuid::new_v4(),
            file_id: job.file_id,
            owner_id: job.owner_id,
            status: JobStatus::Pending,
            attempts: 0,
            max_retries,
            last_error: None,
            run_at: now,
            created_at: now,
            updated_at: now,
        };
        self.jobs.lock().await.push(record.clone());
        Ok(record)
    }

    async fn claim_next(&self) -> Result<Option<JobRecord>, AppError> {
        let now = Utc::now();
        let mut jobs = self.jobs.lock().await;
        let next = jobs
            .iter_mut()
            .filter(|j| j.status == JobStatus::Pending && j.run_at <= now)
            .min_by_key(|j| (j.run_at, j.created_at));

        Ok(next.map(|job| {
            job.status = JobStatus::Running;
            job.updated_at = now;
            job.clone()
        }))
    }

    async fn mark_completed(&self, id: Uuid) -> Result<(), AppError> {
        self.update(id, |job| {
            job.status = JobStatus::Completed;
            job.attempts += 1;
            job.last_error = None;
        })
        .await
    }

    async fn schedule_retry(
        &self,
        id: Uuid,
        error: &str,
        run_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let error = error.to_string();
        self.update(id, move |job| {
            job.status = JobStatus::Pending;
            job.attempts += 1;
            job.last_error = Some(error);
            job.run_at = run_at;
        })
        .await
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        let error = error.to_string();
        self.update(id, move |job| {
            job.status = JobStatus::Failed;
            job.attempts += 1;
            job.last_error = Some(error);
        })
        .await
    }

    async fn reap_stale(&self, stale_before: DateTime<Utc>) -> Result<ReapedJobs, AppError> {
        let now = Utc::now();
        let mut reaped = ReapedJobs::default();
        for job in self
            .jobs
            .lock()
            .await
            .iter_mut()
            .filter(|j| j.status == JobStatus::Running && j.updated_at < stale_before)
        {
            if job.can_retry() {
                job.status = JobStatus::Pending;
                reaped.requeued += 1;
            } else {
                job.status = JobStatus::Failed;
                reaped.failed += 1;
            }
            job.attempts += 1;
            job.last_error = Some(STALE_JOB_ERROR.to_string());
            job.run_at = now;
            job.updated_at = now;
        }
        Ok(reaped)
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobRecord>, AppError> {
        Ok(self.jobs.lock().await.iter().find(|j| j.id == id).cloned())
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<i64, AppError> {
        Ok(self
            .jobs
            .lock()
            .await
            .iter()
            .filter(|j| j.status == status)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ThumbnailJob {
        ThumbnailJob {
            file_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_claim_is_exclusive_and_fifo() {
        let store = InMemoryJobStore::new();
        let first = store.enqueue(job(), 3).await.unwrap();
        let second = store.enqueue(job(), 3).await.unwrap();

        let claimed = store.claim_next().await.unwrap().unwrap();
        assert_eq!(claimed.id, first.id);
        assert_eq!(claimed.status, JobStatus::Running);

        let claimed = store.claim_next().await.unwrap().unwrap();
        assert_eq!(claimed.id, second.id);

        assert!(store.claim_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_retry_is_not_claimable_before_run_at() {
        let store = InMemoryJobStore::new();
        let record = store.enqueue(job(), 3).await.unwrap();
        store.claim_next().await.unwrap();

        store
            .schedule_retry(record.id, "decode failed", Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();

        assert!(store.claim_next().await.unwrap().is_none());
        let stored = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Pending);
        assert_eq!(stored.attempts, 1);
        assert_eq!(stored.last_error.as_deref(), Some("decode failed"));
    }

    #[tokio::test]
    async fn test_reap_stale_requeues_running_jobs() {
        let store = InMemoryJobStore::new();
        let record = store.enqueue(job(), 3).await.unwrap();
        store.claim_next().await.unwrap();

        let reaped = store
            .reap_stale(Utc::now() - chrono::Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(reaped.total(), 0);
        let reaped = store
            .reap_stale(Utc::now() + chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(reaped, ReapedJobs { requeued: 1, failed: 0 });

        let claimed = store.claim_next().await.unwrap().unwrap();
        assert_eq!(claimed.id, record.id);
        assert_eq!(claimed.attempts, 1);
        assert_eq!(claimed.last_error.as_deref(), Some(STALE_JOB_ERROR));
    }

    #[tokio::test]
    async fn test_job_that_keeps_losing_its_worker_is_dead_lettered() {
        let store = InMemoryJobStore::new();
        let record = store.enqueue(job(), 3).await.unwrap();

        let mut runs = 0;
        while store.claim_next().await.unwrap().is_some() {
            runs += 1;
            assert!(runs <= 10, "job was redelivered without bound");
            store
                .reap_stale(Utc::now() + chrono::Duration::seconds(1))
                .await
                .unwrap();
        }

        // The first run plus three retries
        assert_eq!(runs, 4);
        let stored = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert_eq!(stored.attempts, 4);
        assert_eq!(stored.last_error.as_deref(), Some(STALE_JOB_ERROR));
        assert_eq!(store.count_by_status(JobStatus::Failed).await.unwrap(), 1);
    }
}
