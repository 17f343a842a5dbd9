//! Upload pipeline
//!
//! Received → Classified → Stored → Registered → Completed. Any failure ends the run in
//! `Failed` and is logged with the stage it happened in. Files are written before the
//! registry is contacted and are not rolled back if registration fails.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clinvault_core::constants::{
    DEFAULT_CONTENT_TYPE, FILE_TITLE, FULL_IMAGE_TITLE, THUMBNAIL_TITLE,
};
use clinvault_core::{
    AppError, AssetRecord, Attachment, MetadataRecord, StorageConfig, UploadConfig,
    UploadRequest, UploadResponse,
};
use clinvault_processing::{Classification, ImageUploadProcessor};
use clinvault_registry::{Registry, RegistryError};
use clinvault_storage::AssetStore;

use crate::identity::IdentityAllocator;
use crate::log_failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Classified,
    Stored,
    Registered,
    Completed,
    Failed,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::Received => "received",
            UploadStage::Classified => "classified",
            UploadStage::Stored => "stored",
            UploadStage::Registered => "registered",
            UploadStage::Completed => "completed",
            UploadStage::Failed => "failed",
        }
    }
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Stores an uploaded payload and registers it with the registry.
#[derive(Clone)]
pub struct UploadPipeline {
    store: Arc<dyn AssetStore>,
    registry: Arc<dyn Registry>,
    processor: ImageUploadProcessor,
    storage_config: StorageConfig,
    upload_config: UploadConfig,
}

impl UploadPipeline {
    pub fn new(
        store: Arc<dyn AssetStore>,
        registry: Arc<dyn Registry>,
        storage_config: StorageConfig,
        upload_config: UploadConfig,
    ) -> Self {
        Self {
            store,
            registry,
            processor: ImageUploadProcessor::new(),
            storage_config,
            upload_config,
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(size_bytes = request.data.len(), unique_id = tracing::field::Empty)
    )]
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResponse, AppError> {
        let start = std::time::Instant::now();
        let mut stage = UploadStage::Received;

        match self.run(request, &mut stage).await {
            Ok(response) => {
                tracing::info!(
                    stage = %UploadStage::Completed,
                    external_id = %response.external_id,
                    filename = %response.filename,
                    is_image = response.is_image,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload completed"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(stage = %UploadStage::Failed, failed_at = %stage, "Upload failed");
                log_failure(stage.as_str(), &e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: UploadRequest,
        stage: &mut UploadStage,
    ) -> Result<UploadResponse, AppError> {
        self.check_payload(&request)?;

        let original_extension = request.original_extension().unwrap_or_default();
        let UploadRequest {
            data,
            content_type,
            subject_ref,
            author_ref,
            ..
        } = request;
        let data = Arc::new(data);

        let classification = match self.processor.classify(data.clone()).await {
            Ok(classification) => classification,
            Err(e) => {
                tracing::warn!(error = %e, "Classification task failed, storing as file");
                Classification::Other
            }
        };
        *stage = UploadStage::Classified;
        tracing::debug!(stage = %stage, is_image = classification.is_image(), "Upload classified");

        let asset = self.describe(&classification, &original_extension, content_type, data.len());
        tracing::Span::current().record("unique_id", asset.unique_id.as_str());

        let thumbnail_size = self.persist(&asset, data).await?;
        *stage = UploadStage::Stored;
        tracing::debug!(stage = %stage, filename = %asset.stored_filename, "Upload stored");

        let record = Self::metadata_record(&asset, thumbnail_size, subject_ref, author_ref, Utc::now());
        let external_id = match self.registry.create_metadata_record(&record).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(
                    orphaned_files = ?Self::written_files(&asset),
                    "Registration failed, stored files are orphaned"
                );
                return Err(match e {
                    RegistryError::Transport(msg) => AppError::Transport(msg),
                    other => AppError::Registration(other.to_string()),
                });
            }
        };
        *stage = UploadStage::Registered;
        tracing::debug!(stage = %stage, external_id = %external_id, "Upload registered");

        let delete_url = self.upload_config.delete_url(&external_id);
        Ok(UploadResponse::from_asset(&asset, external_id, delete_url))
    }

    fn check_payload(&self, request: &UploadRequest) -> Result<(), AppError> {
        if request.data.is_empty() {
            return Err(AppError::NoFile);
        }
        let max = self.upload_config.max_upload_bytes;
        if request.data.len() > max {
            return Err(AppError::PayloadTooLarge {
                size: request.data.len(),
                max,
            });
        }
        Ok(())
    }

    /// Allocate the id and derive every name, path and URL of the upload.
    fn describe(
        &self,
        classification: &Classification,
        original_extension: &str,
        declared_content_type: Option<String>,
        size: usize,
    ) -> AssetRecord {
        let unique_id = IdentityAllocator::unique_id();

        let (stored_filename, thumbnail_filename, content_type) = match classification.format() {
            Some(format) => (
                IdentityAllocator::original_filename(&unique_id, format.extension()),
                Some(IdentityAllocator::thumbnail_filename(
                    &unique_id,
                    format.extension(),
                )),
                format.mime_type().to_string(),
            ),
            None => (
                IdentityAllocator::original_filename(&unique_id, original_extension),
                None,
                declared_content_type
                    .filter(|ct| !ct.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            ),
        };

        AssetRecord {
            is_image: classification.is_image(),
            format: classification.format(),
            dimensions: classification.dimensions(),
            size_bytes: size as u64,
            content_type,
            relative_path: self.storage_config.relative_path(&stored_filename),
            public_url: self.storage_config.public_url(&stored_filename),
            thumbnail_relative_path: thumbnail_filename
                .as_deref()
                .map(|f| self.storage_config.relative_path(f)),
            thumbnail_url: thumbnail_filename
                .as_deref()
                .map(|f| self.storage_config.public_url(f)),
            stored_filename,
            thumbnail_filename,
            unique_id,
        }
    }

    /// Write the original and, for images, its thumbnail. Returns the thumbnail size.
    async fn persist(&self, asset: &AssetRecord, data: Arc<Vec<u8>>) -> Result<Option<u64>, AppError> {
        let thumbnail = match (asset.format, asset.thumbnail_filename.as_deref()) {
            (Some(format), Some(filename)) => {
                let bytes = self
                    .processor
                    .thumbnail(data.clone(), format)
                    .await
                    .map_err(|e| AppError::Storage(format!("Thumbnail generation failed: {}", e)))?;
                Some((filename, bytes))
            }
            _ => None,
        };

        self.store.save_original(&asset.stored_filename, &data).await?;

        let Some((filename, bytes)) = thumbnail else {
            return Ok(None);
        };

        if let Err(e) = self.store.save_thumbnail(filename, &bytes).await {
            tracing::warn!(
                orphaned_files = ?[&asset.stored_filename],
                "Thumbnail write failed, original is orphaned"
            );
            return Err(e.into());
        }

        Ok(Some(bytes.len() as u64))
    }

    /// Metadata record describing exactly the files written for `asset`.
    pub fn metadata_record(
        asset: &AssetRecord,
        thumbnail_size: Option<u64>,
        subject_ref: Option<String>,
        author_ref: Option<String>,
        creation: DateTime<Utc>,
    ) -> MetadataRecord {
        let mut attachments = vec![Attachment {
            content_type: asset.content_type.clone(),
            url: asset.public_url.clone(),
            size_bytes: Some(asset.size_bytes),
            title: if asset.is_image {
                FULL_IMAGE_TITLE
            } else {
                FILE_TITLE
            }
            .to_string(),
            creation,
        }];

        if let Some(url) = &asset.thumbnail_url {
            attachments.push(Attachment {
                content_type: asset.content_type.clone(),
                url: url.clone(),
                size_bytes: thumbnail_size,
                title: THUMBNAIL_TITLE.to_string(),
                creation,
            });
        }

        MetadataRecord {
            external_id: None,
            attachments,
            subject_ref: subject_ref.filter(|s| !s.trim().is_empty()),
            author_ref: author_ref.filter(|s| !s.trim().is_empty()),
        }
    }

    fn written_files(asset: &AssetRecord) -> Vec<&str> {
        std::iter::once(asset.stored_filename.as_str())
            .chain(asset.thumbnail_filename.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinvault_core::ImageFormat;

    fn asset(is_image: bool) -> AssetRecord {
        AssetRecord {
            unique_id: "abc".to_string(),
            is_image,
            format: is_image.then_some(ImageFormat::Png),
            dimensions: is_image.then_some((50, 50)),
            stored_filename: if is_image { "abc.png" } else { "abc.txt" }.to_string(),
            thumbnail_filename: is_image.then(|| "abc_thumb.png".to_string()),
            size_bytes: 10,
            content_type: if is_image { "image/png" } else { "text/plain" }.to_string(),
            relative_path: "uploads/abc.png".to_string(),
            thumbnail_relative_path: is_image.then(|| "uploads/abc_thumb.png".to_string()),
            public_url: "http://h/uploads/abc.png".to_string(),
            thumbnail_url: is_image.then(|| "http://h/uploads/abc_thumb.png".to_string()),
        }
    }

    #[test]
    fn test_metadata_record_for_image() {
        let record = UploadPipeline::metadata_record(
            &asset(true),
            Some(7),
            Some("Patient/1".to_string()),
            Some("  ".to_string()),
            Utc::now(),
        );

        let titles: Vec<_> = record.attachments.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["full-image", "thumbnail"]);
        assert_eq!(record.attachments[0].size_bytes, Some(10));
        assert_eq!(record.attachments[1].size_bytes, Some(7));
        assert!(record.attachments.iter().all(|a| a.content_type == "image/png"));
        assert_eq!(record.subject_ref.as_deref(), Some("Patient/1"));
        assert_eq!(record.author_ref, None);
    }

    #[test]
    fn test_metadata_record_for_file() {
        let record = UploadPipeline::metadata_record(&asset(false), None, None, None, Utc::now());

        assert_eq!(record.attachments.len(), 1);
        assert_eq!(record.attachments[0].title, "file");
        assert_eq!(record.attachments[0].content_type, "text/plain");
    }

    #[test]
    fn test_written_files() {
        assert_eq!(
            UploadPipeline::written_files(&asset(true)),
            vec!["abc.png", "abc_thumb.png"]
        );
        assert_eq!(UploadPipeline::written_files(&asset(false)), vec!["abc.txt"]);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(UploadStage::Received.to_string(), "received");
        assert_eq!(UploadStage::Failed.as_str(), "failed");
    }
}
