//! In-process store implementations
//!
//! Used by the HTTP integration tests and by `STOWAGE_BACKEND=memory`. They keep
//! the same observable semantics as the Postgres repositories (ordering,
//! conditional updates, passive session expiry) without a database.

mod files;
mod jobs;
mod sessions;
mod users;

pub use files::InMemoryMetadataStore;
pub use jobs::InMemoryJobStore;
pub use sessions::InMemorySessionStore;
pub use users::InMemoryUserStore;
