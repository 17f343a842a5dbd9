use crate::keys::validate_key;
use crate::traits::{AssetStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem asset store
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    reserved_marker: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// Creates the directory and the reserved marker file when they are missing.
    ///
    /// # Arguments
    /// * `base_path` - Asset directory (e.g., "/var/lib/clinvault/uploads")
    /// * `reserved_marker` - Filename that survives purges (e.g., ".gitkeep")
    pub async fn new(
        base_path: impl Into<PathBuf>,
        reserved_marker: impl Into<String>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();
        let reserved_marker = reserved_marker.into();

        validate_key(&reserved_marker)?;

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let marker_path = base_path.join(&reserved_marker);
        if !fs::try_exists(&marker_path).await.unwrap_or(false) {
            fs::File::create(&marker_path).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create marker {}: {}",
                    marker_path.display(),
                    e
                ))
            })?;
        }

        Ok(LocalStorage {
            base_path,
            reserved_marker,
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    async fn write(&self, key: &str, data: &[u8], kind: &'static str) -> StorageResult<PathBuf> {
        let path = self.key_to_path(key)?;
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
            key = %key,
            kind,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(path)
    }
}

#[async_trait]
impl AssetStore for LocalStorage {
    async fn save_original(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf> {
        self.write(filename, data, "original").await
    }

    async fn save_thumbnail(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf> {
        self.write(filename, data, "thumbnail").await
    }

    async fn delete(&self, filename: &str) -> StorageResult<bool> {
        if filename == self.reserved_marker {
            return Err(StorageError::InvalidKey(format!(
                "{} is reserved and cannot be deleted",
                filename
            )));
        }

        let path = self.key_to_path(filename)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %filename, "File already absent, nothing to delete");
                return Ok(false);
            }
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %filename,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(true)
    }

    async fn list_all(&self) -> StorageResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::ListFailed(format!(
                "Failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        Ok(names)
    }

    async fn purge_all(&self) -> StorageResult<usize> {
        let start = std::time::Instant::now();
        let mut removed = 0;

        for name in self.list_all().await? {
            if name == self.reserved_marker {
                continue;
            }
            if self.delete(&name).await? {
                removed += 1;
            }
        }

        tracing::info!(
            path = %self.base_path.display(),
            removed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage purge successful"
        );

        Ok(removed)
    }

    fn reserved_marker(&self) -> &str {
        &self.reserved_marker
    }
}
