//! Job handlers run by the worker pool.

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use stowage_core::models::{JobRecord, NodeKind};
use stowage_db::MetadataStore;
use stowage_processing::ThumbnailRenderer;
use stowage_storage::{variant_key, Storage};

use crate::error::JobError;

/// Work performed for one claimed job.
///
/// Handlers must be idempotent: a job can be delivered more than once (stale
/// running jobs are requeued), and a rerun must leave the same blobs behind.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &JobRecord) -> anyhow::Result<()>;
}

/// Renders and stores every thumbnail variant of an image node.
///
/// Variants are written next to the original blob under
/// [`variant_key`]`(content_ref, size)`, overwriting earlier renders.
pub struct ThumbnailHandler {
    metadata: Arc<dyn MetadataStore>,
    storage: Arc<dyn Storage>,
}

impl ThumbnailHandler {
    pub fn new(metadata: Arc<dyn MetadataStore>, storage: Arc<dyn Storage>) -> Self {
        Self { metadata, storage }
    }
}

#[async_trait]
impl JobHandler for ThumbnailHandler {
    #[tracing::instrument(skip(self, job), fields(job.id = %job.id, file_id = %job.file_id))]
    async fn handle(&self, job: &JobRecord) -> anyhow::Result<()> {
        let node = self
            .metadata
            .find_owned(job.owner_id, job.file_id)
            .await
            .map_err(JobError::recoverable)?
            .ok_or_else(|| {
                JobError::unrecoverable(anyhow::anyhow!(
                    "File {} not found for owner {}",
                    job.file_id,
                    job.owner_id
                ))
            })?;

        if node.kind != NodeKind::Image {
            return Err(JobError::unrecoverable(anyhow::anyhow!(
                "File {} is a {}, not an image",
                node.id,
                node.kind
            ))
            .into());
        }

        let content_ref = node.content_ref.as_deref().ok_or_else(|| {
            JobError::unrecoverable(anyhow::anyhow!("Image {} has no content", node.id))
        })?;

        let data = self
            .storage
            .download(content_ref)
            .await
            .map_err(JobError::recoverable)?;
        let source_bytes = data.len();

        let variants = tokio::task::spawn_blocking(move || ThumbnailRenderer::render_all(&data))
            .await
            .context("Thumbnail render task panicked")?
            .map_err(JobError::unrecoverable)?;

        for (size, bytes) in variants {
            self.storage
                .upload_with_key(&variant_key(content_ref, size), bytes)
                .await
                .map_err(JobError::recoverable)?;
        }

        tracing::info!(
            file_id = %node.id,
            source_bytes,
            "Thumbnails generated"
        );

        Ok(())
    }
}
