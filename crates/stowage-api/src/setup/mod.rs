//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod stores;

use crate::state::AppState;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use stowage_core::Config;
use stowage_worker::ThumbnailQueue;

/// Everything `main` needs to serve requests and shut down cleanly.
pub struct Application {
    pub state: Arc<AppState>,
    pub router: Router,
    pub queue: ThumbnailQueue,
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<Application> {
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format());

    tracing::info!(backend = %config.backend(), "Configuration loaded and validated");

    let stores = stores::setup_stores(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let (state, queue) = services::initialize_services(&config, stores, storage);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok(Application {
        state,
        router,
        queue,
    })
}
