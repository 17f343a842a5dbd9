//! Registry abstraction trait
//!
//! The pipelines talk to the registry through this trait so that tests can
//! substitute failing or recording implementations.

use async_trait::async_trait;
use clinvault_core::{DependentRecord, MetadataRecord};

use crate::error::RegistryResult;

/// Dependents found by a reference search.
#[derive(Debug, Clone, PartialEq)]
pub struct DependentSearch {
    pub dependents: Vec<DependentRecord>,
    /// `false` when result pages were left unread, so more dependents may exist.
    pub complete: bool,
}

impl DependentSearch {
    pub fn complete(dependents: Vec<DependentRecord>) -> Self {
        Self {
            dependents,
            complete: true,
        }
    }
}

#[async_trait]
pub trait Registry: Send + Sync {
    /// Create a metadata record and return the id the registry assigned.
    async fn create_metadata_record(&self, record: &MetadataRecord) -> RegistryResult<String>;

    /// Fetch a metadata record. `RegistryError::NotFound` when it does not exist.
    async fn fetch_metadata_record(&self, external_id: &str) -> RegistryResult<MetadataRecord>;

    /// Dependents whose reference list points at the metadata record, across every
    /// result page that could be read.
    async fn find_dependents_referencing(
        &self,
        external_id: &str,
    ) -> RegistryResult<DependentSearch>;

    /// Replace a dependent record in full.
    async fn update_dependent(&self, record: &DependentRecord) -> RegistryResult<()>;

    /// Delete a metadata record. A record that is already gone counts as deleted.
    async fn delete_metadata_record(&self, external_id: &str) -> RegistryResult<()>;
}
