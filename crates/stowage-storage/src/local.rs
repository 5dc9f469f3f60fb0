use crate::keys::{is_valid_key, new_blob_key};
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem blob store: one flat directory of opaquely named files.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `base_path` (e.g. "/tmp/files_manager").
    ///
    /// The directory is created if missing, and again on any later write if it
    /// was removed in the meantime.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Keys are single path components, so a valid key can never escape the
    /// base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if !is_valid_key(storage_key) {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(storage_key))
    }

    async fn write_file(&self, storage_key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        fs::create_dir_all(&self.base_path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, data: Bytes) -> StorageResult<String> {
        let key = new_blob_key();
        self.write_file(&key, &data).await?;
        Ok(key)
    }

    async fn upload_with_key(&self, storage_key: &str, data: Bytes) -> StorageResult<()> {
        self.write_file(storage_key, &data).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(Bytes::from(data))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let key = storage_key.to_string();
        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    error = %e,
                    "Local storage stream download error"
                );
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await? {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), key = %storage_key, "Local storage delete successful");

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn health_check(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).await?;
        let meta = fs::metadata(&self.base_path).await?;
        if !meta.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "{} is not a directory",
                self.base_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::variant_key;
    use stowage_core::models::ThumbnailSize;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_storage_upload_download() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let key = storage.upload(Bytes::from_static(b"hi")).await.unwrap();

        assert!(dir.path().join(&key).is_file());
        let downloaded = storage.download(&key).await.unwrap();
        assert_eq!(&downloaded[..], b"hi");
    }

    #[tokio::test]
    async fn test_creates_root_on_first_write() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("files_manager");
        let storage = LocalStorage::new(&root).await.unwrap();
        std::fs::remove_dir(&root).unwrap();

        let key = storage.upload(Bytes::from_static(b"data")).await.unwrap();
        assert!(root.join(key).is_file());
    }

    #[tokio::test]
    async fn test_unreadable_root_is_an_io_error() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("files_manager");
        let storage = LocalStorage::new(&root).await.unwrap();
        std::fs::remove_dir(&root).unwrap();
        std::fs::write(&root, b"not a directory").unwrap();

        let result = storage.exists("some-key").await;
        assert!(matches!(result, Err(StorageError::IoError(_))));

        let result = storage.download("some-key").await;
        assert!(matches!(result, Err(StorageError::IoError(_))));

        let result = storage.delete("some-key").await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let result = storage.download("does-not-exist").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(storage.download_stream("does-not-exist").await.is_err());
        assert!(storage.delete("does-not-exist").await.is_ok());
        assert!(!storage.exists("does-not-exist").await.unwrap());
    }

    #[tokio::test]
    async fn test_variant_writes_overwrite() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let key = variant_key("original", ThumbnailSize::W250);

        storage
            .upload_with_key(&key, Bytes::from_static(b"first rendering"))
            .await
            .unwrap();
        storage
            .upload_with_key(&key, Bytes::from_static(b"second"))
            .await
            .unwrap();

        assert_eq!(&storage.download(&key).await.unwrap()[..], b"second");
        assert!(storage.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_local_storage_stream_download() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let data = b"stream download test".to_vec();

        let key = storage.upload(Bytes::from(data.clone())).await.unwrap();

        let mut stream = storage.download_stream(&key).await.unwrap();
        let mut downloaded = Vec::new();
        while let Some(chunk_result) = stream.next().await {
            downloaded.extend_from_slice(&chunk_result.unwrap());
        }

        assert_eq!(data, downloaded);
    }
}
