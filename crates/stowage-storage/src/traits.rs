//! Storage abstraction trait
//!
//! This module defines the Storage trait that all blob store backends implement.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use stowage_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => AppError::node_not_found(),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Blob store abstraction
///
/// Originals are write-once under a generated key; variants are written with
/// [`Storage::upload_with_key`] and overwrite any previous rendering.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store a new blob under a freshly generated key and return that key.
    async fn upload(&self, data: Bytes) -> StorageResult<String>;

    /// Store (or overwrite) a blob at a caller-chosen key.
    async fn upload_with_key(&self, storage_key: &str, data: Bytes) -> StorageResult<()>;

    /// Read a whole blob into memory
    async fn download(&self, storage_key: &str) -> StorageResult<Bytes>;

    /// Read a blob as a stream of chunks
    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Delete a blob; deleting a missing blob succeeds
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Whether the store root is reachable
    async fn health_check(&self) -> StorageResult<()>;
}
