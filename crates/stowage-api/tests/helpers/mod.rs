//! Test helpers: a full application over in-memory stores and a temporary
//! blob directory, with a fast-polling thumbnail worker pool.
//!
//! Run with: `cargo test -p stowage-api`

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use std::sync::Arc;
use stowage_api::{initialize_app, AppState};
use stowage_core::{Config, ServiceConfig, StoreBackend};
use stowage_worker::ThumbnailQueue;
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub queue: ThumbnailQueue,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config(folder_path: &str) -> Config {
    let mut inner = ServiceConfig::default();
    inner.backend = StoreBackend::Memory;
    inner.folder_path = folder_path.to_string();
    inner.worker_poll_interval_ms = 25;
    inner.worker_max_retries = 5;
    Config(Box::new(inner))
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp_dir.path().to_string_lossy());

    let app = initialize_app(config)
        .await
        .expect("Failed to initialize app");
    let server =
        TestServer::new(app.router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state: app.state,
        queue: app.queue,
        _temp_dir: temp_dir,
    }
}
