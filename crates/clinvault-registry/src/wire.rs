//! JSON shapes exchanged with the registry.
//!
//! Only the fields this crate reads or writes are modelled; everything else in a
//! response is ignored on the way in.

use chrono::{DateTime, Utc};
use clinvault_core::constants::{DEFAULT_CONTENT_TYPE, DOCUMENT_REFERENCE};
use clinvault_core::{Attachment, MetadataRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Reference {
    pub reference: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireAttachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    pub attachment: WireAttachment,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentReference {
    #[serde(default)]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<Reference>,
    #[serde(default)]
    pub content: Vec<Content>,
}

impl From<&MetadataRecord> for DocumentReference {
    fn from(record: &MetadataRecord) -> Self {
        DocumentReference {
            resource_type: DOCUMENT_REFERENCE.to_string(),
            id: record.external_id.clone(),
            status: Some("current".to_string()),
            subject: record.subject_ref.clone().map(|reference| Reference { reference }),
            author: record
                .author_ref
                .iter()
                .cloned()
                .map(|reference| Reference { reference })
                .collect(),
            content: record
                .attachments
                .iter()
                .map(|a| Content {
                    attachment: WireAttachment {
                        content_type: Some(a.content_type.clone()),
                        url: Some(a.url.clone()),
                        size: a.size_bytes,
                        title: Some(a.title.clone()),
                        creation: Some(a.creation),
                    },
                })
                .collect(),
        }
    }
}

impl From<DocumentReference> for MetadataRecord {
    fn from(doc: DocumentReference) -> Self {
        MetadataRecord {
            external_id: doc.id,
            // An attachment without a URL names no file and carries nothing we act on.
            attachments: doc
                .content
                .into_iter()
                .filter_map(|c| {
                    let a = c.attachment;
                    Some(Attachment {
                        url: a.url?,
                        content_type: a
                            .content_type
                            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
                        size_bytes: a.size,
                        title: a.title.unwrap_or_default(),
                        creation: a.creation.unwrap_or_default(),
                    })
                })
                .collect(),
            subject_ref: doc.subject.map(|s| s.reference),
            author_ref: doc.author.into_iter().next().map(|a| a.reference),
        }
    }
}

/// One page of a search result set.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Bundle {
    #[serde(default)]
    pub link: Vec<BundleLink>,
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// URL of the following page, if the server has more results.
    pub fn next_page(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == "next")
            .map(|l| l.url.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BundleLink {
    pub relation: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BundleEntry {
    #[serde(default)]
    pub resource: Option<Map<String, JsonValue>>,
}

/// Minimal view of a created resource, used to read back the assigned id.
#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    #[serde(default)]
    pub id: Option<String>,
}
