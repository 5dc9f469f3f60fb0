//! Store selection per backend

use anyhow::Result;
use std::sync::Arc;
use stowage_core::{Config, StoreBackend};
use stowage_db::{
    FileRepository, InMemoryJobStore, InMemoryMetadataStore, InMemorySessionStore,
    InMemoryUserStore, JobRepository, JobStore, MetadataStore, SessionRepository, SessionStore,
    UserRepository, UserStore,
};

use super::database::setup_database;

/// The four stores behind the service, all trait objects.
#[derive(Clone)]
pub struct Stores {
    pub metadata: Arc<dyn MetadataStore>,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub jobs: Arc<dyn JobStore>,
}

impl Stores {
    /// Process-local stores; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self {
            metadata: Arc::new(InMemoryMetadataStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
            sessions: Arc::new(InMemorySessionStore::new()),
            jobs: Arc::new(InMemoryJobStore::new()),
        }
    }
}

pub async fn setup_stores(config: &Config) -> Result<Stores> {
    match config.backend() {
        StoreBackend::Postgres => {
            let pool = setup_database(config).await?;
            Ok(Stores {
                metadata: Arc::new(FileRepository::new(pool.clone())),
                users: Arc::new(UserRepository::new(pool.clone())),
                sessions: Arc::new(SessionRepository::new(pool.clone())),
                jobs: Arc::new(JobRepository::new(pool)),
            })
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores, data is lost on restart");
            Ok(Stores::in_memory())
        }
    }
}
