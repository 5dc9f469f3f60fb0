use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use stowage_core::models::{FileNode, NewFileNode};
use stowage_core::AppError;
use uuid::Uuid;

/// Document store for [`FileNode`] records.
///
/// Inserts are atomic per node and `set_public` is a single conditional update
/// keyed on both id and owner, so no caller needs in-process locking.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a node; the store assigns its id and creation time.
    async fn insert(&self, node: NewFileNode) -> Result<FileNode, AppError>;

    /// Look up a node by id regardless of owner.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileNode>, AppError>;

    /// Look up a node by id, only if `owner_id` owns it.
    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> Result<Option<FileNode>, AppError>;

    /// One page of an owner's nodes under `parent_id` (`None` = root), in
    /// creation order.
    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FileNode>, AppError>;

    /// Set `is_public` on a node matching both id and owner. Returns `None` when
    /// nothing matched.
    async fn set_public(
        &self,
        owner_id: Uuid,
        id: Uuid,
        value: bool,
    ) -> Result<Option<FileNode>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Whether the store answers at all
    async fn ping(&self) -> Result<(), AppError>;
}

const NODE_COLUMNS: &str =
    "id, owner_id, name, kind, is_public, parent_id, content_ref, created_at";

/// Postgres-backed metadata store
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for FileRepository {
    #[tracing::instrument(skip(self, node), fields(db.table = "files", db.operation = "insert", kind = %node.kind))]
    async fn insert(&self, node: NewFileNode) -> Result<FileNode, AppError> {
        let query = format!(
            r#"
            INSERT INTO files (id, owner_id, name, kind, is_public, parent_id, content_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {NODE_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<Postgres, FileNode>(&query)
            .bind(Uuid::new_v4())
            .bind(node.owner_id)
            .bind(&node.name)
            .bind(node.kind)
            .bind(node.is_public)
            .bind(node.parent_id)
            .bind(&node.content_ref)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileNode>, AppError> {
        let query = format!("SELECT {NODE_COLUMNS} FROM files WHERE id = $1");
        let node = sqlx::query_as::<Postgres, FileNode>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(node)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = %id))]
    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> Result<Option<FileNode>, AppError> {
        let query = format!("SELECT {NODE_COLUMNS} FROM files WHERE id = $1 AND owner_id = $2");
        let node = sqlx::query_as::<Postgres, FileNode>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(node)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FileNode>, AppError> {
        let query = format!(
            r#"
            SELECT {NODE_COLUMNS} FROM files
            WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2
            ORDER BY created_at ASC, id ASC
            OFFSET $3 LIMIT $4
            "#
        );

        let nodes = sqlx::query_as::<Postgres, FileNode>(&query)
            .bind(owner_id)
            .bind(parent_id)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(nodes)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "update", db.record_id = %id))]
    async fn set_public(
        &self,
        owner_id: Uuid,
        id: Uuid,
        value: bool,
    ) -> Result<Option<FileNode>, AppError> {
        let query = format!(
            "UPDATE files SET is_public = $3 WHERE id = $1 AND owner_id = $2 RETURNING {NODE_COLUMNS}"
        );

        let node = sqlx::query_as::<Postgres, FileNode>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(node)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "count"))]
    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
