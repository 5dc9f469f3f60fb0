//! Database repositories for data access layer
//!
//! Each store is an `async_trait` interface so services can be wired against
//! Postgres in production and the in-memory stores in tests.

pub mod files;
pub mod jobs;
pub mod sessions;
pub mod users;

pub use files::{FileRepository, MetadataStore};
pub use jobs::{JobRepository, JobStore, ReapedJobs, STALE_JOB_ERROR};
pub use sessions::{SessionRepository, SessionStore};
pub use users::{UserRepository, UserStore};
