//! In-memory registry with failure switches.

use async_trait::async_trait;
use clinvault_core::{DependentRecord, MetadataRecord};
use clinvault_registry::{DependentSearch, Registry, RegistryError, RegistryResult};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct RegistryState {
    pub next_id: u64,
    pub records: HashMap<String, MetadataRecord>,
    pub dependents: Vec<DependentRecord>,
    pub calls: Vec<&'static str>,
    pub fail_create: bool,
    pub fail_fetch: bool,
    pub fail_find: bool,
    /// Return only the first matching dependent and report the search incomplete.
    pub truncate_search: bool,
    pub fail_delete: bool,
    pub fail_update_for: HashSet<String>,
}

#[derive(Default)]
pub struct FakeRegistry {
    state: Mutex<RegistryState>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap()
    }

    pub fn insert_record(&self, id: &str, urls: &[&str]) {
        let record = MetadataRecord {
            external_id: Some(id.to_string()),
            attachments: urls
                .iter()
                .map(|url| clinvault_core::Attachment {
                    content_type: "application/octet-stream".to_string(),
                    url: url.to_string(),
                    size_bytes: None,
                    title: "file".to_string(),
                    creation: chrono::Utc::now(),
                })
                .collect(),
            subject_ref: None,
            author_ref: None,
        };
        self.state().records.insert(id.to_string(), record);
    }

    /// Add a `DiagnosticReport` whose `media` array holds the given references.
    pub fn insert_dependent(&self, id: &str, references: &[&str]) {
        let media: Vec<JsonValue> = references
            .iter()
            .map(|r| serde_json::json!({ "link": { "reference": r } }))
            .collect();
        let body = serde_json::json!({
            "resourceType": "DiagnosticReport",
            "id": id,
            "status": "final",
            "media": media,
        });
        let record =
            DependentRecord::from_resource(body.as_object().cloned().unwrap(), "media").unwrap();
        self.state().dependents.push(record);
    }

    pub fn dependent(&self, id: &str) -> DependentRecord {
        self.state()
            .dependents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .unwrap()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn create_metadata_record(&self, record: &MetadataRecord) -> RegistryResult<String> {
        let mut state = self.state();
        state.calls.push("create");
        if state.fail_create {
            return Err(RegistryError::Rejected {
                status: 500,
                body: "registry unavailable".to_string(),
            });
        }

        state.next_id += 1;
        let id = format!("doc-{}", state.next_id);
        let mut stored = record.clone();
        stored.external_id = Some(id.clone());
        state.records.insert(id.clone(), stored);
        Ok(id)
    }

    async fn fetch_metadata_record(&self, external_id: &str) -> RegistryResult<MetadataRecord> {
        let mut state = self.state();
        state.calls.push("fetch");
        if state.fail_fetch {
            return Err(RegistryError::Transport("connection reset".to_string()));
        }
        state
            .records
            .get(external_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(MetadataRecord::reference_for(external_id)))
    }

    async fn find_dependents_referencing(
        &self,
        external_id: &str,
    ) -> RegistryResult<DependentSearch> {
        let mut state = self.state();
        state.calls.push("find");
        if state.fail_find {
            return Err(RegistryError::Transport("search timed out".to_string()));
        }
        let mut dependents: Vec<DependentRecord> = state
            .dependents
            .iter()
            .filter(|d| d.references(external_id))
            .cloned()
            .collect();
        if state.truncate_search {
            dependents.truncate(1);
            return Ok(DependentSearch {
                dependents,
                complete: false,
            });
        }
        Ok(DependentSearch::complete(dependents))
    }

    async fn update_dependent(&self, record: &DependentRecord) -> RegistryResult<()> {
        let mut state = self.state();
        state.calls.push("update");
        if state.fail_update_for.contains(&record.id) {
            return Err(RegistryError::Rejected {
                status: 409,
                body: "version conflict".to_string(),
            });
        }
        match state.dependents.iter_mut().find(|d| d.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(RegistryError::NotFound(record.id.clone())),
        }
    }

    async fn delete_metadata_record(&self, external_id: &str) -> RegistryResult<()> {
        let mut state = self.state();
        state.calls.push("delete");
        if state.fail_delete {
            return Err(RegistryError::Transport("connection refused".to_string()));
        }
        state.records.remove(external_id);
        Ok(())
    }
}
