use stowage_core::models::{FileNode, NodeKind, ThumbnailSize};
use stowage_core::AppError;
use stowage_processing::content_type_for;
use stowage_storage::{variant_key, ByteStream};
use uuid::Uuid;

use super::FileService;
use crate::auth::{authorize, Access};

/// Blob bytes ready to stream back, with the content type inferred from the
/// node's name.
pub struct NodeContent {
    pub content_type: String,
    pub stream: ByteStream,
}

impl FileService {
    /// Metadata of a node owned by `owner_id`. Someone else's node is
    /// indistinguishable from a missing one.
    #[tracing::instrument(skip(self), fields(owner_id = %owner_id, file_id = %id))]
    pub async fn get_metadata(&self, owner_id: Uuid, id: Uuid) -> Result<FileNode, AppError> {
        let node = self.lookup(id).await?;
        authorize(Some(owner_id), &node, Access::Owner).into_result()?;
        Ok(node)
    }

    /// Content of a node, public or owned by `requester`.
    ///
    /// `size` selects a thumbnail variant and is only honoured for images; a
    /// variant that has not been generated yet is "Not found".
    #[tracing::instrument(skip(self), fields(file_id = %id))]
    pub async fn get_content(
        &self,
        requester: Option<Uuid>,
        id: Uuid,
        size: Option<ThumbnailSize>,
    ) -> Result<NodeContent, AppError> {
        let node = self.lookup(id).await?;
        authorize(requester, &node, Access::Read).into_result()?;

        if node.kind == NodeKind::Folder {
            return Err(AppError::Conflict("folder has no content".to_string()));
        }

        let content_ref = node
            .content_ref
            .as_deref()
            .ok_or_else(AppError::node_not_found)?;
        let key = match size {
            Some(size) if node.kind == NodeKind::Image => variant_key(content_ref, size),
            _ => content_ref.to_string(),
        };

        let stream = self.storage.download_stream(&key).await?;

        Ok(NodeContent {
            content_type: content_type_for(&node.name),
            stream,
        })
    }

    /// Store failures during retrieval read as "Not found" rather than leaking
    /// internals.
    async fn lookup(&self, id: Uuid) -> Result<FileNode, AppError> {
        match self.metadata.find_by_id(id).await {
            Ok(Some(node)) => Ok(node),
            Ok(None) => Err(AppError::node_not_found()),
            Err(e) => {
                tracing::warn!(error = %e, file_id = %id, "Node lookup failed");
                Err(AppError::node_not_found())
            }
        }
    }
}
