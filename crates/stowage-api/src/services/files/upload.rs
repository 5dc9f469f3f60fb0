use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use stowage_core::models::{FileNode, NewFileNode, NodeKind, ParentRef, ThumbnailJob};
use stowage_core::AppError;
use uuid::Uuid;

use super::{CreateFileRequest, FileService};
use crate::auth::{authorize, Access, Authorization};

/// A creation request that passed validation, before anything is written.
struct ValidatedUpload {
    name: String,
    kind: NodeKind,
    parent_id: Option<Uuid>,
    is_public: bool,
    content: Option<Bytes>,
}

impl FileService {
    /// Create a folder, file or image for `owner_id`.
    ///
    /// All validation, including the parent lookup, completes before the blob
    /// write and the metadata insert. Image uploads then enqueue a thumbnail
    /// job; a failed enqueue is logged and does not fail the upload.
    #[tracing::instrument(skip(self, request), fields(owner_id = %owner_id))]
    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreateFileRequest,
    ) -> Result<FileNode, AppError> {
        let upload = self.validate_upload(owner_id, request).await?;

        let content_ref = match upload.content {
            Some(data) => Some(self.storage.upload(data).await?),
            None => None,
        };

        let new_node = NewFileNode {
            owner_id,
            name: upload.name,
            kind: upload.kind,
            is_public: upload.is_public,
            parent_id: upload.parent_id,
            content_ref: content_ref.clone(),
        };

        let node = match self.metadata.insert(new_node).await {
            Ok(node) => node,
            Err(e) => {
                // The blob has no metadata pointing at it, remove it.
                if let Some(key) = content_ref {
                    let storage = self.storage.clone();
                    tokio::spawn(async move {
                        if let Err(cleanup_err) = storage.delete(&key).await {
                            tracing::error!(
                                error = %cleanup_err,
                                key = %key,
                                "Failed to clean up orphaned blob after insert failure"
                            );
                        }
                    });
                }
                return Err(e);
            }
        };

        if node.kind == NodeKind::Image {
            let job = ThumbnailJob {
                file_id: node.id,
                owner_id,
            };
            if let Err(e) = self.queue.enqueue(job).await {
                tracing::warn!(
                    error = %e,
                    file_id = %node.id,
                    "Failed to enqueue thumbnail job, image stored without thumbnails"
                );
            }
        }

        tracing::info!(
            file_id = %node.id,
            kind = %node.kind,
            parent_id = ?node.parent_id,
            "Node created"
        );

        Ok(node)
    }

    async fn validate_upload(
        &self,
        owner_id: Uuid,
        request: CreateFileRequest,
    ) -> Result<ValidatedUpload, AppError> {
        let name = request
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::validation("Missing name"))?;

        let kind = request
            .kind
            .as_deref()
            .and_then(|kind| kind.parse::<NodeKind>().ok())
            .ok_or_else(|| AppError::validation("Missing type"))?;

        let content = if kind.has_content() {
            let data = request
                .data
                .filter(|data| !data.is_empty())
                .ok_or_else(|| AppError::validation("Missing data"))?;
            let decoded = STANDARD
                .decode(data.trim())
                .map_err(|_| AppError::validation("Invalid data"))?;
            Some(Bytes::from(decoded))
        } else {
            None
        };

        let parent_id = self
            .resolve_parent(owner_id, ParentRef::from_wire(request.parent_id.as_ref()))
            .await?;

        Ok(ValidatedUpload {
            name,
            kind,
            parent_id,
            is_public: request.is_public.unwrap_or(false),
            content,
        })
    }

    /// The parent must be a folder owned by the caller. Someone else's node
    /// reads as "Parent not found", like a missing one.
    async fn resolve_parent(
        &self,
        owner_id: Uuid,
        parent: ParentRef,
    ) -> Result<Option<Uuid>, AppError> {
        let parent_id = match parent {
            ParentRef::Root => return Ok(None),
            ParentRef::Unresolvable => return Err(AppError::validation("Parent not found")),
            ParentRef::Node(id) => id,
        };

        let parent = self
            .metadata
            .find_by_id(parent_id)
            .await?
            .filter(|node| {
                authorize(Some(owner_id), node, Access::Owner) == Authorization::Authorized
            })
            .ok_or_else(|| AppError::validation("Parent not found"))?;

        if parent.kind != NodeKind::Folder {
            return Err(AppError::validation("Parent not a folder"));
        }

        Ok(Some(parent.id))
    }
}
