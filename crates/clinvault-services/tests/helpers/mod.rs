#![allow(dead_code)]

pub mod fixtures;
pub mod registry;
pub mod storage;

use clinvault_core::{StorageConfig, UploadConfig};
use clinvault_registry::Registry;
use clinvault_services::{DeletePipeline, PurgePipeline, UploadPipeline};
use clinvault_storage::{AssetStore, LocalStorage};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use registry::FakeRegistry;
use storage::FailingStore;

pub const PUBLIC_BASE_URL: &str = "http://localhost:8080/uploads";
pub const MARKER: &str = ".gitkeep";

/// Asset directory in a temp dir plus the pipelines wired against it.
pub struct TestEnv {
    pub store: Arc<FailingStore>,
    pub storage_config: StorageConfig,
    pub upload_config: UploadConfig,
    pub _temp_dir: TempDir,
}

impl TestEnv {
    pub fn path(&self) -> PathBuf {
        self.storage_config.path.clone()
    }

    pub fn asset_store(&self) -> Arc<dyn AssetStore> {
        self.store.clone()
    }

    pub fn upload_pipeline(&self, registry: Arc<dyn Registry>) -> UploadPipeline {
        UploadPipeline::new(
            self.asset_store(),
            registry,
            self.storage_config.clone(),
            self.upload_config.clone(),
        )
    }

    pub fn delete_pipeline(&self, registry: Arc<dyn Registry>) -> DeletePipeline {
        DeletePipeline::new(self.asset_store(), registry)
    }

    pub fn purge_pipeline(&self) -> PurgePipeline {
        PurgePipeline::new(self.asset_store())
    }

    /// Sorted filenames currently in the asset directory.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn read(&self, filename: &str) -> Vec<u8> {
        std::fs::read(self.path().join(filename)).unwrap()
    }

    pub fn public_url(&self, filename: &str) -> String {
        self.storage_config.public_url(filename)
    }
}

/// Setup an isolated asset directory with the default marker.
pub async fn setup_test_env() -> TestEnv {
    let temp_dir = TempDir::new().unwrap();
    let storage_config = StorageConfig {
        path: temp_dir.path().join("uploads"),
        public_base_url: PUBLIC_BASE_URL.to_string(),
        relative_dir: "uploads".to_string(),
        reserved_marker: MARKER.to_string(),
    };

    let local = LocalStorage::new(storage_config.path.clone(), MARKER)
        .await
        .unwrap();

    TestEnv {
        store: Arc::new(FailingStore::new(local)),
        storage_config,
        upload_config: UploadConfig {
            max_upload_bytes: 1024 * 1024,
            delete_url_base: "/assets/delete".to_string(),
        },
        _temp_dir: temp_dir,
    }
}

pub fn fake_registry() -> Arc<FakeRegistry> {
    Arc::new(FakeRegistry::new())
}
