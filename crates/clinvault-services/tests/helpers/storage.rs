//! Asset store wrapper that can be told to fail.

use async_trait::async_trait;
use clinvault_storage::{AssetStore, LocalStorage, StorageError, StorageResult};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct FailingStore {
    inner: LocalStorage,
    pub fail_save: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl FailingStore {
    pub fn new(inner: LocalStorage) -> Self {
        Self {
            inner,
            fail_save: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    pub fn fail_saves(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetStore for FailingStore {
    async fn save_original(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("disk full".to_string()));
        }
        self.inner.save_original(filename, data).await
    }

    async fn save_thumbnail(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("disk full".to_string()));
        }
        self.inner.save_thumbnail(filename, data).await
    }

    async fn delete(&self, filename: &str) -> StorageResult<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("permission denied".to_string()));
        }
        self.inner.delete(filename).await
    }

    async fn list_all(&self) -> StorageResult<Vec<String>> {
        self.inner.list_all().await
    }

    async fn purge_all(&self) -> StorageResult<usize> {
        self.inner.purge_all().await
    }

    fn reserved_marker(&self) -> &str {
        self.inner.reserved_marker()
    }
}
