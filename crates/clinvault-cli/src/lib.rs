//! Wiring shared by the `clinvault` binary: tracing setup, pipeline construction from
//! configuration, and the JSON shape errors are reported in.

use std::sync::Arc;

use anyhow::Context;
use clinvault_core::{AppError, Config, ErrorMetadata};
use clinvault_services::{
    create_store, DeletePipeline, PurgePipeline, RegistryClient, UploadPipeline,
};
use serde::Serialize;

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,clinvault=info")),
        )
        .init();
}

/// The three pipelines wired against one store and one registry client.
pub struct Pipelines {
    pub upload: UploadPipeline,
    pub delete: DeletePipeline,
    pub purge: PurgePipeline,
}

impl Pipelines {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = create_store(&config.storage)
            .await
            .context("Failed to open asset directory")?;
        let registry =
            Arc::new(RegistryClient::new(&config.registry).context("Failed to create registry client")?);

        Ok(Self {
            upload: UploadPipeline::new(
                store.clone(),
                registry.clone(),
                config.storage.clone(),
                config.upload.clone(),
            ),
            delete: DeletePipeline::new(store.clone(), registry),
            purge: PurgePipeline::new(store),
        })
    }
}

/// Error body printed on stderr when a pipeline fails.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorReport {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
    pub recoverable: bool,
    pub suggested_action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorReport {
    /// Details are hidden in production and for sensitive errors.
    pub fn new(err: &AppError, is_production: bool) -> Self {
        let details = if is_production || err.is_sensitive() {
            None
        } else {
            Some(err.to_string())
        };

        Self {
            error: err.client_message(),
            code: err.error_code(),
            status: err.http_status_code(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            details,
        }
    }
}
