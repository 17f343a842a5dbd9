use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::constants::{DOCUMENT_REFERENCE, MAX_RESOURCE_ID_LEN};

/// One file attached to a metadata record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub content_type: String,
    pub url: String,
    pub size_bytes: Option<u64>,
    pub title: String,
    pub creation: DateTime<Utc>,
}

/// Registry record describing an asset's files and its optional subject/author links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    /// Assigned by the registry; `None` until the record has been created.
    pub external_id: Option<String>,
    pub attachments: Vec<Attachment>,
    pub subject_ref: Option<String>,
    pub author_ref: Option<String>,
}

impl MetadataRecord {
    /// Reference string other records use to point at this one.
    pub fn reference_for(external_id: &str) -> String {
        format!("{}/{}", DOCUMENT_REFERENCE, external_id)
    }

    pub fn attachment_urls(&self) -> impl Iterator<Item = &str> {
        self.attachments.iter().map(|a| a.url.as_str())
    }
}

/// A registry record that points at a metadata record.
///
/// The full resource body is kept so an update can replace the record without dropping
/// fields this crate does not model. `reference_field` names the array inside the body
/// holding the references; `reference_list` mirrors its contents.
#[derive(Debug, Clone, PartialEq)]
pub struct DependentRecord {
    pub id: String,
    pub reference_list: Vec<String>,
    pub reference_field: String,
    pub body: Map<String, JsonValue>,
}

impl DependentRecord {
    /// Build from a raw resource body. Returns `None` when the body has no `id`.
    pub fn from_resource(body: Map<String, JsonValue>, reference_field: &str) -> Option<Self> {
        let id = body.get("id")?.as_str()?.to_string();
        let reference_list = body
            .get(reference_field)
            .and_then(JsonValue::as_array)
            .map(|items| items.iter().filter_map(extract_reference).collect())
            .unwrap_or_default();

        Some(Self {
            id,
            reference_list,
            reference_field: reference_field.to_string(),
            body,
        })
    }

    /// Copy of this record with every reference to `external_id` removed, or `None`
    /// when the record does not reference it (nothing to update).
    pub fn without_reference(&self, external_id: &str) -> Option<Self> {
        let items = self
            .body
            .get(&self.reference_field)
            .and_then(JsonValue::as_array)?;

        let kept: Vec<JsonValue> = items
            .iter()
            .filter(|item| {
                extract_reference(item)
                    .map(|r| !references_record(&r, external_id))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        if kept.len() == items.len() {
            return None;
        }

        let mut body = self.body.clone();
        let reference_list = kept.iter().filter_map(extract_reference).collect();
        body.insert(self.reference_field.clone(), JsonValue::Array(kept));

        Some(Self {
            id: self.id.clone(),
            reference_list,
            reference_field: self.reference_field.clone(),
            body,
        })
    }

    pub fn references(&self, external_id: &str) -> bool {
        self.reference_list
            .iter()
            .any(|r| references_record(r, external_id))
    }
}

/// Pull the reference string out of one array element. Understands
/// `{"link": {"reference": ..}}`, `{"reference": ..}` and bare strings.
fn extract_reference(item: &JsonValue) -> Option<String> {
    if let Some(s) = item.as_str() {
        return Some(s.to_string());
    }
    item.get("link")
        .and_then(|link| link.get("reference"))
        .or_else(|| item.get("reference"))
        .and_then(JsonValue::as_str)
        .map(String::from)
}

/// Registry resource ids are 1-64 characters of `[A-Za-z0-9-.]`. Anything else could
/// steer a request path at a different resource.
pub fn is_valid_resource_id(id: &str) -> bool {
    (1..=MAX_RESOURCE_ID_LEN).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
        && id != "."
        && id != ".."
}

/// Relative (`DocumentReference/1`), absolute (`https://reg/DocumentReference/1`) and
/// bare (`1`) forms all point at the same record.
fn references_record(reference: &str, external_id: &str) -> bool {
    let relative = MetadataRecord::reference_for(external_id);
    reference == external_id
        || reference == relative
        || reference.ends_with(&format!("/{}", relative))
}
