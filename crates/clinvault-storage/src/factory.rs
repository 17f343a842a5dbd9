use crate::{AssetStore, LocalStorage, StorageResult};
use clinvault_core::StorageConfig;
use std::sync::Arc;

/// Create the asset store described by configuration
pub async fn create_store(config: &StorageConfig) -> StorageResult<Arc<dyn AssetStore>> {
    let storage = LocalStorage::new(config.path.clone(), config.reserved_marker.clone()).await?;

    tracing::debug!(
        path = %config.path.display(),
        reserved_marker = %config.reserved_marker,
        "Asset store ready"
    );

    Ok(Arc::new(storage))
}
