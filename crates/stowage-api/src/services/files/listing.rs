use stowage_core::models::{FileNode, ParentRef};
use uuid::Uuid;

use super::FileService;
use crate::constants::PAGE_SIZE;

impl FileService {
    /// One page of `owner_id`'s nodes under `parent`, in creation order.
    ///
    /// Never fails: an unresolvable parent or a store error yields an empty page.
    #[tracing::instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list(&self, owner_id: Uuid, parent: ParentRef, page: i64) -> Vec<FileNode> {
        let parent_id = match parent {
            ParentRef::Root => None,
            ParentRef::Node(id) => Some(id),
            ParentRef::Unresolvable => return Vec::new(),
        };
        let offset = page.max(0).saturating_mul(PAGE_SIZE);

        match self
            .metadata
            .list_children(owner_id, parent_id, offset, PAGE_SIZE)
            .await
        {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(error = %e, "Listing failed, returning an empty page");
                Vec::new()
            }
        }
    }
}
