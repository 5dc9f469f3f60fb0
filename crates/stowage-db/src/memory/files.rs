use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use stowage_core::models::{FileNode, NewFileNode};
use stowage_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::MetadataStore;

/// Nodes kept in insertion order, which is also their creation order.
#[derive(Clone, Default)]
pub struct InMemoryMetadataStore {
    nodes: Arc<RwLock<Vec<FileNode>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert(&self, node: NewFileNode) -> Result<FileNode, AppError> {
        let created = node.into_node(Uuid::new_v4(), Utc::now());
        self.nodes.write().await.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileNode>, AppError> {
        Ok(self.nodes.read().await.iter().find(|n| n.id == id).cloned())
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> Result<Option<FileNode>, AppError> {
        Ok(self
            .nodes
            .read()
            .await
            .iter()
            .find(|n| n.id == id && n.owner_id == owner_id)
            .cloned())
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FileNode>, AppError> {
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(self
            .nodes
            .read()
            .await
            .iter()
            .filter(|n| n.owner_id == owner_id && n.parent_id == parent_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn set_public(
        &self,
        owner_id: Uuid,
        id: Uuid,
        value: bool,
    ) -> Result<Option<FileNode>, AppError> {
        let mut nodes = self.nodes.write().await;
        Ok(nodes
            .iter_mut()
            .find(|n| n.id == id && n.owner_id == owner_id)
            .map(|n| {
                n.is_public = value;
                n.clone()
            }))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.nodes.read().await.len() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
