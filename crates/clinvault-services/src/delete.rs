//! Cascading delete
//!
//! | step | action                                   | on failure       |
//! |------|------------------------------------------|------------------|
//! | 1    | validate id (registry id charset)        | fatal            |
//! | 2    | fetch metadata record                    | fatal            |
//! | 3    | detach dependents                        | warning per item |
//! | 4    | delete metadata record                   | warning          |
//! | 5    | remove local files named by attachments  | fatal            |
//!
//! Steps 3 and 4 cannot undo each other, so the registry may end up partially cleaned.
//! Step 5 runs regardless and is the only failure surfaced after the remote steps.

use std::sync::Arc;

use clinvault_core::{is_valid_resource_id, AppError, DependentRecord, MetadataRecord};
use clinvault_registry::Registry;
use clinvault_storage::{filename_from_url, AssetStore};
use serde::Serialize;

use crate::log_failure;

/// Degraded cascade step a warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    FindDependents,
    UpdateDependent,
    DeleteMetadataRecord,
    ResolveAttachment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeWarning {
    pub step: CascadeStep,
    /// Record or URL the step was working on.
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "warnings", rename_all = "snake_case")]
pub enum DeleteStatus {
    Clean,
    CleanedWithWarnings(Vec<CascadeWarning>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub external_id: String,
    #[serde(flatten)]
    pub status: DeleteStatus,
    pub dependents_detached: usize,
    pub files_removed: usize,
}

impl DeleteOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self.status, DeleteStatus::Clean)
    }

    pub fn warnings(&self) -> &[CascadeWarning] {
        match &self.status {
            DeleteStatus::Clean => &[],
            DeleteStatus::CleanedWithWarnings(warnings) => warnings,
        }
    }
}

/// Removes an asset from the registry and the asset directory.
#[derive(Clone)]
pub struct DeletePipeline {
    store: Arc<dyn AssetStore>,
    registry: Arc<dyn Registry>,
}

impl DeletePipeline {
    pub fn new(store: Arc<dyn AssetStore>, registry: Arc<dyn Registry>) -> Self {
        Self { store, registry }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, external_id: &str) -> Result<DeleteOutcome, AppError> {
        let start = std::time::Instant::now();

        let result = self.run(external_id.trim()).await;
        match &result {
            Ok(outcome) => tracing::info!(
                external_id = %outcome.external_id,
                dependents_detached = outcome.dependents_detached,
                files_removed = outcome.files_removed,
                warnings = outcome.warnings().len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Delete completed"
            ),
            Err(e) => log_failure("delete", e),
        }
        result
    }

    async fn run(&self, external_id: &str) -> Result<DeleteOutcome, AppError> {
        if external_id.is_empty() {
            return Err(AppError::InvalidId("A record id is required".to_string()));
        }
        if !is_valid_resource_id(external_id) {
            return Err(AppError::InvalidId(format!(
                "{:?} is not a registry record id",
                external_id
            )));
        }

        let record = self.registry.fetch_metadata_record(external_id).await?;

        let mut warnings = Vec::new();
        let dependents_detached = self.detach_dependents(external_id, &mut warnings).await;

        if let Err(e) = self.registry.delete_metadata_record(external_id).await {
            tracing::warn!(external_id, error = %e, "Metadata record delete failed, continuing");
            warnings.push(CascadeWarning {
                step: CascadeStep::DeleteMetadataRecord,
                target: MetadataRecord::reference_for(external_id),
                message: e.to_string(),
            });
        }

        let files_removed = self
            .remove_files(external_id, &record, &mut warnings)
            .await?;

        let status = if warnings.is_empty() {
            DeleteStatus::Clean
        } else {
            DeleteStatus::CleanedWithWarnings(warnings)
        };

        Ok(DeleteOutcome {
            external_id: external_id.to_string(),
            status,
            dependents_detached,
            files_removed,
        })
    }

    /// Strip references to the record from every dependent. Returns how many were updated.
    async fn detach_dependents(&self, external_id: &str, warnings: &mut Vec<CascadeWarning>) -> usize {
        let search = match self.registry.find_dependents_referencing(external_id).await {
            Ok(search) => search,
            Err(e) => {
                tracing::warn!(external_id, error = %e, "Dependent lookup failed, skipping detach");
                warnings.push(CascadeWarning {
                    step: CascadeStep::FindDependents,
                    target: MetadataRecord::reference_for(external_id),
                    message: e.to_string(),
                });
                return 0;
            }
        };

        if !search.complete {
            tracing::warn!(external_id, found = search.dependents.len(), "Dependent lookup incomplete");
            warnings.push(CascadeWarning {
                step: CascadeStep::FindDependents,
                target: MetadataRecord::reference_for(external_id),
                message: "Search results were not fully read; some dependents may still reference the record"
                    .to_string(),
            });
        }

        let updates: Vec<DependentRecord> = search
            .dependents
            .iter()
            .filter_map(|d| d.without_reference(external_id))
            .collect();

        let mut detached = 0;
        for update in updates {
            match self.registry.update_dependent(&update).await {
                Ok(()) => detached += 1,
                Err(e) => {
                    tracing::warn!(
                        external_id,
                        dependent_id = %update.id,
                        error = %e,
                        "Dependent update failed, continuing"
                    );
                    warnings.push(CascadeWarning {
                        step: CascadeStep::UpdateDependent,
                        target: update.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        detached
    }

    /// Delete every local file the record's attachments point at. Every file is tried;
    /// any storage failure makes the whole step fail.
    async fn remove_files(
        &self,
        external_id: &str,
        record: &MetadataRecord,
        warnings: &mut Vec<CascadeWarning>,
    ) -> Result<usize, AppError> {
        let mut removed = 0;
        let mut failures = Vec::new();

        for url in record.attachment_urls() {
            let filename = match filename_from_url(url) {
                Some(name) if name != self.store.reserved_marker() => name,
                _ => {
                    tracing::warn!(external_id, url, "Attachment URL names no deletable file");
                    warnings.push(CascadeWarning {
                        step: CascadeStep::ResolveAttachment,
                        target: url.to_string(),
                        message: "URL does not name a deletable file".to_string(),
                    });
                    continue;
                }
            };

            match self.store.delete(&filename).await {
                Ok(true) => removed += 1,
                Ok(false) => tracing::debug!(external_id, filename = %filename, "File already absent"),
                Err(e) => {
                    tracing::error!(external_id, filename = %filename, error = %e, "Local file delete failed");
                    failures.push(format!("{}: {}", filename, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(AppError::LocalCleanupIncomplete {
                external_id: external_id.to_string(),
                reason: failures.join("; "),
            });
        }

        Ok(removed)
    }
}
