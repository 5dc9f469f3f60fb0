//! Stowage DB Library
//!
//! Store interfaces for file metadata, users, sessions and thumbnail jobs, each
//! with a Postgres repository and an in-memory implementation.

pub mod db;
pub mod memory;

pub use db::{
    FileRepository, JobRepository, JobStore, MetadataStore, ReapedJobs, SessionRepository,
    SessionStore, UserRepository, UserStore, STALE_JOB_ERROR,
};
pub use memory::{InMemoryJobStore, InMemoryMetadataStore, InMemorySessionStore, InMemoryUserStore};
