//! Service wiring: the file service, auth state and the thumbnail worker pool

use std::sync::Arc;
use stowage_core::Config;
use stowage_storage::Storage;
use stowage_worker::{ThumbnailHandler, ThumbnailQueue, ThumbnailQueueConfig};

use super::stores::Stores;
use crate::services::files::FileService;
use crate::state::{AppState, AuthState};

pub fn queue_config(config: &Config) -> ThumbnailQueueConfig {
    ThumbnailQueueConfig {
        max_workers: config.worker_max_workers(),
        poll_interval_ms: config.worker_poll_interval_ms(),
        job_timeout_seconds: config.worker_job_timeout_seconds(),
        max_retries: config.worker_max_retries(),
        ..ThumbnailQueueConfig::default()
    }
}

/// Build the application state and start the in-process worker pool.
pub fn initialize_services(
    config: &Config,
    stores: Stores,
    storage: Arc<dyn Storage>,
) -> (Arc<AppState>, ThumbnailQueue) {
    let handler = Arc::new(ThumbnailHandler::new(
        stores.metadata.clone(),
        storage.clone(),
    ));
    let queue_config = queue_config(config);
    tracing::info!(
        max_workers = queue_config.max_workers,
        max_retries = queue_config.max_retries,
        "Starting thumbnail worker pool"
    );
    let queue = ThumbnailQueue::new(stores.jobs.clone(), queue_config, handler);

    let files = FileService::new(
        stores.metadata.clone(),
        storage.clone(),
        Arc::new(queue.clone()),
    );

    let auth = AuthState {
        users: stores.users,
        sessions: stores.sessions,
        session_ttl: chrono::Duration::seconds(config.session_ttl_seconds()),
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        files,
        auth,
        metadata: stores.metadata,
        storage,
    });

    (state, queue)
}
