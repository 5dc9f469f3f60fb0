use stowage_core::AppError;
use thiserror::Error;

/// Failure to hand a job to the queue.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Failed to enqueue thumbnail job: {0}")]
    Enqueue(String),
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        AppError::Queue(err.to_string())
    }
}

/// Error from a job handler, tagged with whether another attempt can help.
///
/// Plain `anyhow` errors that are not a `JobError` count as recoverable.
#[derive(Debug, Error)]
#[error("{inner}")]
pub struct JobError {
    inner: anyhow::Error,
    recoverable: bool,
}

impl JobError {
    /// The job fails immediately and is dead-lettered.
    pub fn unrecoverable(err: impl Into<anyhow::Error>) -> Self {
        Self {
            inner: err.into(),
            recoverable: false,
        }
    }

    /// The job is retried per the queue's backoff policy.
    pub fn recoverable(err: impl Into<anyhow::Error>) -> Self {
        Self {
            inner: err.into(),
            recoverable: true,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    pub(crate) fn is_unrecoverable(err: &anyhow::Error) -> bool {
        err.downcast_ref::<JobError>()
            .map(|je| !je.is_recoverable())
            .unwrap_or(false)
    }
}
