//! Clinvault Services Layer
//!
//! The pipelines behind the three inbound operations. Each one is a stateless
//! orchestrator over an [`AssetStore`] and a [`Registry`]; both are injected as trait
//! objects so they can be shared across invocations and replaced in tests.
//!
//! - [`UploadPipeline`]: classify, store, register
//! - [`DeletePipeline`]: cascade a registry delete down to dependents and local files
//! - [`PurgePipeline`]: empty the asset directory

pub mod delete;
pub mod identity;
pub mod purge;
pub mod upload;

use clinvault_core::{AppError, ErrorMetadata, LogLevel};

pub use clinvault_registry::{Registry, RegistryClient, RegistryError};
pub use clinvault_storage::{create_store, AssetStore, LocalStorage, StorageError};
pub use delete::{CascadeStep, CascadeWarning, DeleteOutcome, DeletePipeline, DeleteStatus};
pub use identity::IdentityAllocator;
pub use purge::{PurgePipeline, PurgeReport};
pub use upload::{UploadPipeline, UploadStage};

/// Log a pipeline failure at the level the error asks for.
pub(crate) fn log_failure(stage: &str, error: &AppError) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(stage, error = %error, error_code, "Pipeline failed");
        }
        LogLevel::Warn => {
            tracing::warn!(stage, error = %error, error_code, "Pipeline failed");
        }
        LogLevel::Error => {
            tracing::error!(stage, error = %error, error_code, "Pipeline failed");
        }
    }
}
