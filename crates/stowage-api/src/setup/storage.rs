//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use stowage_core::Config;
use stowage_storage::{LocalStorage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.folder_path())
        .await
        .context("Failed to initialize blob storage")?;

    tracing::info!(
        folder_path = %storage.base_path().display(),
        "Local blob storage initialized"
    );

    Ok(Arc::new(storage))
}
