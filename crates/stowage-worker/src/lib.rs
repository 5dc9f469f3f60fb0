//! Stowage Worker Library
//!
//! Durable thumbnail job queue: producers call [`JobQueue::enqueue`], a pool of
//! workers claims jobs from the [`stowage_db::JobStore`] and renders variants.

pub mod error;
pub mod handler;
pub mod queue;

pub use error::{JobError, QueueError};
pub use handler::{JobHandler, ThumbnailHandler};
pub use queue::{JobQueue, ThumbnailQueue, ThumbnailQueueConfig, MAX_RETRY_BACKOFF_SECS};
