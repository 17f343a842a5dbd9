//! Image upload processor: classification + thumbnail derivation off the async pool.

use std::sync::Arc;

use clinvault_core::ImageFormat;

use crate::error::{ProcessingError, ProcessingResult};
use crate::image::{AssetClassifier, Classification, Thumbnailer};

/// Runs the CPU-bound image work on tokio's blocking pool.
#[derive(Clone, Debug, Default)]
pub struct ImageUploadProcessor;

impl ImageUploadProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Classify a payload. Fails only if the blocking task itself fails.
    pub async fn classify(&self, data: Arc<Vec<u8>>) -> ProcessingResult<Classification> {
        // Decode is CPU-bound; run off the async pool to avoid blocking other tasks.
        tokio::task::spawn_blocking(move || AssetClassifier::classify(&data))
            .await
            .map_err(|e| ProcessingError::Task(e.to_string()))
    }

    /// Derive the thumbnail for an image already classified as `format`.
    pub async fn thumbnail(
        &self,
        data: Arc<Vec<u8>>,
        format: ImageFormat,
    ) -> ProcessingResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || Thumbnailer::generate(&data, format))
            .await
            .map_err(|e| ProcessingError::Task(e.to_string()))?
    }
}
