//! Asset store abstraction trait
//!
//! This module defines the AssetStore trait that the upload, delete and purge
//! pipelines work against.

use async_trait::async_trait;
use clinvault_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Asset store abstraction trait
///
/// The store exclusively owns the files in one flat directory. Keys are bare
/// filenames; see the crate root documentation.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write the payload exactly as received and return the path written.
    async fn save_original(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf>;

    /// Write an already derived thumbnail beside its original.
    async fn save_thumbnail(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf>;

    /// Remove a file. Returns `false` when it was already absent; a missing file is
    /// not an error.
    async fn delete(&self, filename: &str) -> StorageResult<bool>;

    /// Names of all files in the directory, sorted.
    async fn list_all(&self) -> StorageResult<Vec<String>>;

    /// Delete every file except the reserved marker. Returns the number removed.
    async fn purge_all(&self) -> StorageResult<usize>;

    /// Name of the file that is never purged or deleted.
    fn reserved_marker(&self) -> &str;
}
