//! Thumbnail job queue: submission, worker pool, retry and dead-lettering.
//!
//! Jobs live in a [`JobStore`], so with the Postgres store they survive restarts
//! and several processes can consume the same queue. Delivery is at-least-once:
//! a job left `running` by a crashed worker is requeued by the stale job reaper.
//!
//! Shutdown: [`ThumbnailQueue::shutdown`] signals the pool to stop claiming; it
//! does not wait for in-flight jobs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::sleep;

use stowage_core::models::{JobRecord, ThumbnailJob};
use stowage_db::JobStore;

use crate::error::{JobError, QueueError};
use crate::handler::JobHandler;

/// Maximum delay in seconds before retrying a failed job.
pub const MAX_RETRY_BACKOFF_SECS: u64 = 300;

/// Exponential backoff in seconds for a job with `attempts` finished attempts.
#[inline]
pub(crate) fn compute_retry_backoff_seconds(attempts: i32) -> u64 {
    2_u64
        .checked_pow(attempts.max(0) as u32)
        .unwrap_or(u64::MAX)
        .min(MAX_RETRY_BACKOFF_SECS)
}

/// Producer side of the queue. The upload pipeline only ever sees this.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Durably record a job. Returns once the job is stored, not processed.
    async fn enqueue(&self, job: ThumbnailJob) -> Result<(), QueueError>;
}

#[derive(Debug, Clone)]
pub struct ThumbnailQueueConfig {
    pub max_workers: usize,
    pub poll_interval_ms: u64,
    pub job_timeout_seconds: u64,
    pub max_retries: i32,
    /// Seconds between stale job reaper runs; 0 disables the reaper.
    pub stale_job_reap_interval_secs: u64,
    /// Added to the job timeout before a running job counts as stale.
    pub stale_job_grace_period_secs: u64,
}

impl Default for ThumbnailQueueConfig {
    fn default() -> Self {
        Self {
            max_workers: 2,
            poll_interval_ms: 1000,
            job_timeout_seconds: 60,
            max_retries: 3,
            stale_job_reap_interval_secs: 60,
            stale_job_grace_period_secs: 60,
        }
    }
}

#[derive(Clone)]
pub struct ThumbnailQueue {
    store: Arc<dyn JobStore>,
    config: ThumbnailQueueConfig,
    shutdown_tx: mpsc::Sender<()>,
    notify_tx: mpsc::Sender<()>,
}

impl ThumbnailQueue {
    /// Create the queue and spawn its worker pool on the current runtime.
    pub fn new(
        store: Arc<dyn JobStore>,
        config: ThumbnailQueueConfig,
        handler: Arc<dyn JobHandler>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (notify_tx, notify_rx) = mpsc::channel(16);

        tokio::spawn(Self::worker_pool(
            store.clone(),
            config.clone(),
            handler,
            shutdown_rx,
            notify_rx,
            notify_tx.clone(),
        ));

        Self {
            store,
            config,
            shutdown_tx,
            notify_tx,
        }
    }

    /// A queue that only records jobs. Another process (or a later
    /// [`ThumbnailQueue::new`] over the same store) consumes them.
    pub fn new_no_worker(store: Arc<dyn JobStore>, config: ThumbnailQueueConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (notify_tx, notify_rx) = mpsc::channel(1);
        drop(shutdown_rx);
        drop(notify_rx);
        Self {
            store,
            config,
            shutdown_tx,
            notify_tx,
        }
    }

    async fn worker_pool(
        store: Arc<dyn JobStore>,
        config: ThumbnailQueueConfig,
        handler: Arc<dyn JobHandler>,
        mut shutdown_rx: mpsc::Receiver<()>,
        mut notify_rx: mpsc::Receiver<()>,
        notify_tx: mpsc::Sender<()>,
    ) {
        tracing::info!(
            max_workers = config.max_workers,
            poll_interval_ms = config.poll_interval_ms,
            max_retries = config.max_retries,
            "Thumbnail worker pool started"
        );

        let semaphore = Arc::new(Semaphore::new(config.max_workers));
        let poll_interval = Duration::from_millis(config.poll_interval_ms);
        let job_timeout = Duration::from_secs(config.job_timeout_seconds);

        let (reaper_shutdown_tx, reaper_shutdown_rx) = mpsc::channel::<()>(1);
        if config.stale_job_reap_interval_secs > 0 {
            tokio::spawn(Self::stale_job_reaper(
                store.clone(),
                config.clone(),
                reaper_shutdown_rx,
            ));
        }

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Thumbnail worker pool shutting down");
                    let _ = reaper_shutdown_tx.send(()).await;
                    break;
                }
                _ = notify_rx.recv() => {
                    Self::claim_and_dispatch_one(&store, &semaphore, &handler, job_timeout, &notify_tx).await;
                }
                _ = sleep(poll_interval) => {
                    Self::claim_and_dispatch_one(&store, &semaphore, &handler, job_timeout, &notify_tx).await;
                }
            }
        }

        tracing::info!("Thumbnail worker pool stopped");
    }

    async fn stale_job_reaper(
        store: Arc<dyn JobStore>,
        config: ThumbnailQueueConfig,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(config.stale_job_reap_interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let stale_after = chrono::Duration::seconds(
            (config.job_timeout_seconds + config.stale_job_grace_period_secs) as i64,
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match store.reap_stale(Utc::now() - stale_after).await {
                        Ok(reaped) if reaped.total() == 0 => {}
                        Ok(reaped) => tracing::warn!(
                            requeued = reaped.requeued,
                            dead_lettered = reaped.failed,
                            "Reaped stale running jobs"
                        ),
                        Err(e) => tracing::error!(error = %e, "Stale job reaper failed"),
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    }

    async fn claim_and_dispatch_one(
        store: &Arc<dyn JobStore>,
        semaphore: &Arc<Semaphore>,
        handler: &Arc<dyn JobHandler>,
        job_timeout: Duration,
        notify_tx: &mpsc::Sender<()>,
    ) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::debug!("No workers available, skipping claim");
                return;
            }
        };

        match store.claim_next().await {
            Ok(Some(job)) => {
                let store = store.clone();
                let handler = handler.clone();
                let notify_tx = notify_tx.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(e) =
                        Self::process_job_with_retry(job, store, handler, job_timeout).await
                    {
                        tracing::error!(error = %e, "Thumbnail job failed");
                    }
                    // Keep draining while there may be a backlog.
                    let _ = notify_tx.try_send(());
                });
            }
            Ok(None) => {
                drop(permit);
                tracing::trace!("No jobs available in queue");
            }
            Err(e) => {
                drop(permit);
                tracing::error!(error = %e, "Failed to claim job from queue");
            }
        }
    }

    #[tracing::instrument(skip(store, handler), fields(job.id = %job.id, file_id = %job.file_id, attempts = job.attempts))]
    async fn process_job_with_retry(
        job: JobRecord,
        store: Arc<dyn JobStore>,
        handler: Arc<dyn JobHandler>,
        job_timeout: Duration,
    ) -> Result<()> {
        let error = match tokio::time::timeout(job_timeout, handler.handle(&job)).await {
            Ok(Ok(())) => {
                store
                    .mark_completed(job.id)
                    .await
                    .context("Failed to mark job as completed")?;
                tracing::info!(job_id = %job.id, "Thumbnail job completed");
                return Ok(());
            }
            Ok(Err(e)) => e,
            Err(_) => anyhow::anyhow!(
                "Thumbnail job timed out after {}s",
                job_timeout.as_secs()
            ),
        };

        let unrecoverable = JobError::is_unrecoverable(&error);
        tracing::warn!(
            job_id = %job.id,
            error = %error,
            attempts = job.attempts,
            max_retries = job.max_retries,
            unrecoverable,
            "Thumbnail job attempt failed"
        );

        if !unrecoverable && job.can_retry() {
            let backoff_seconds = compute_retry_backoff_seconds(job.attempts);
            let run_at = Utc::now() + chrono::Duration::seconds(backoff_seconds as i64);
            store
                .schedule_retry(job.id, &error.to_string(), run_at)
                .await
                .context("Failed to schedule job retry")?;
            tracing::info!(
                job_id = %job.id,
                attempt = job.attempts + 1,
                backoff_seconds,
                "Scheduled thumbnail job retry"
            );
            return Ok(());
        }

        store
            .mark_failed(job.id, &error.to_string())
            .await
            .context("Failed to mark job as failed")?;
        tracing::error!(job_id = %job.id, "Thumbnail job dead-lettered");
        Err(error)
    }

    /// Signal the worker pool to stop claiming jobs. Returns immediately.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating thumbnail queue shutdown");
        let _ = self.shutdown_tx.send(()).await;
    }
}

#[async_trait]
impl JobQueue for ThumbnailQueue {
    #[tracing::instrument(skip(self), fields(file_id = %job.file_id))]
    async fn enqueue(&self, job: ThumbnailJob) -> Result<(), QueueError> {
        let record = self
            .store
            .enqueue(job, self.config.max_retries)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, file_id = %job.file_id, "Failed to store thumbnail job");
                QueueError::Enqueue(e.to_string())
            })?;

        // Wake an idle worker; a full or closed channel just means polling picks it up.
        let _ = self.notify_tx.try_send(());

        tracing::info!(job_id = %record.id, file_id = %job.file_id, "Thumbnail job enqueued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stowage_core::models::JobStatus;
    use stowage_db::InMemoryJobStore;
    use uuid::Uuid;

    struct CountingHandler {
        calls: AtomicUsize,
        outcome: fn() -> anyhow::Result<()>,
    }

    impl CountingHandler {
        fn new(outcome: fn() -> anyhow::Result<()>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobHandler for CountingHandler {
        async fn handle(&self, _job: &JobRecord) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn fast_config(max_retries: i32) -> ThumbnailQueueConfig {
        ThumbnailQueueConfig {
            max_workers: 2,
            poll_interval_ms: 10,
            job_timeout_seconds: 5,
            max_retries,
            stale_job_reap_interval_secs: 0,
            stale_job_grace_period_secs: 0,
        }
    }

    fn job() -> ThumbnailJob {
        ThumbnailJob {
            file_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
        }
    }

    async fn wait_for_status(store: &InMemoryJobStore, status: JobStatus) -> JobRecord {
        for _ in 0..500 {
            if let Some(record) = store.all().await.into_iter().find(|r| r.status == status) {
                return record;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("no job reached status {status}");
    }

    #[test]
    fn retry_backoff_exponential_then_capped() {
        assert_eq!(compute_retry_backoff_seconds(0), 1);
        assert_eq!(compute_retry_backoff_seconds(1), 2);
        assert_eq!(compute_retry_backoff_seconds(2), 4);
        assert_eq!(compute_retry_backoff_seconds(8), 256);
        assert_eq!(compute_retry_backoff_seconds(9), MAX_RETRY_BACKOFF_SECS);
        assert_eq!(compute_retry_backoff_seconds(64), MAX_RETRY_BACKOFF_SECS);
    }

    #[tokio::test]
    async fn test_enqueued_job_is_processed() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler = CountingHandler::new(|| Ok(()));
        let queue = ThumbnailQueue::new(store.clone(), fast_config(3), handler.clone());

        queue.enqueue(job()).await.unwrap();

        let record = wait_for_status(&store, JobStatus::Completed).await;
        assert_eq!(record.attempts, 1);
        assert_eq!(handler.calls(), 1);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_unrecoverable_error_is_dead_lettered_without_retry() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler =
            CountingHandler::new(|| Err(JobError::unrecoverable(anyhow::anyhow!("not an image")).into()));
        let queue = ThumbnailQueue::new(store.clone(), fast_config(3), handler.clone());

        queue.enqueue(job()).await.unwrap();

        let record = wait_for_status(&store, JobStatus::Failed).await;
        assert_eq!(record.attempts, 1);
        assert_eq!(record.last_error.as_deref(), Some("not an image"));
        assert_eq!(handler.calls(), 1);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_recoverable_error_retries_then_dead_letters() {
        let store = Arc::new(InMemoryJobStore::new());
        let handler = CountingHandler::new(|| Err(anyhow::anyhow!("disk busy")));
        let queue = ThumbnailQueue::new(store.clone(), fast_config(1), handler.clone());

        queue.enqueue(job()).await.unwrap();

        // One retry after a 1s backoff, then dead-lettered.
        let record = wait_for_status(&store, JobStatus::Failed).await;
        assert_eq!(record.attempts, 2);
        assert_eq!(handler.calls(), 2);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_no_worker_queue_only_records() {
        let store = Arc::new(InMemoryJobStore::new());
        let queue = ThumbnailQueue::new_no_worker(store.clone(), fast_config(3));

        queue.enqueue(job()).await.unwrap();
        sleep(Duration::from_millis(50)).await;

        let records = store.all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, JobStatus::Pending);
        assert_eq!(records[0].max_retries, 3);
    }
}
