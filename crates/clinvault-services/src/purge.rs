//! Purge: empty the asset directory, keeping only the reserved marker.
//!
//! The registry is not consulted, so records pointing at purged files are left behind.

use std::sync::Arc;

use clinvault_core::AppError;
use clinvault_storage::AssetStore;
use serde::Serialize;

use crate::log_failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub removed: usize,
}

#[derive(Clone)]
pub struct PurgePipeline {
    store: Arc<dyn AssetStore>,
}

impl PurgePipeline {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn purge(&self) -> Result<PurgeReport, AppError> {
        match self.store.purge_all().await {
            Ok(removed) => {
                tracing::info!(removed, "Purge completed");
                Ok(PurgeReport { removed })
            }
            Err(e) => {
                let err = AppError::from(e);
                log_failure("purge", &err);
                Err(err)
            }
        }
    }
}
