use stowage_core::models::FileNode;
use stowage_core::AppError;
use uuid::Uuid;

use super::FileService;

impl FileService {
    /// Set `is_public` on a node owned by `owner_id`.
    ///
    /// A single conditional update on (id, owner); setting the current value
    /// again returns the node unchanged.
    #[tracing::instrument(skip(self), fields(owner_id = %owner_id, file_id = %id))]
    pub async fn set_public(
        &self,
        owner_id: Uuid,
        id: Uuid,
        value: bool,
    ) -> Result<FileNode, AppError> {
        let node = self
            .metadata
            .set_public(owner_id, id, value)
            .await?
            .ok_or_else(AppError::node_not_found)?;

        tracing::info!(file_id = %id, is_public = value, "Visibility updated");
        Ok(node)
    }
}
