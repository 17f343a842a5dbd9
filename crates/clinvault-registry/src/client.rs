//! reqwest implementation of [`Registry`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use clinvault_core::constants::{DOCUMENT_REFERENCE, FHIR_JSON};
use clinvault_core::{is_valid_resource_id, DependentRecord, MetadataRecord, RegistryConfig};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Client, IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RegistryError, RegistryResult};
use crate::traits::{DependentSearch, Registry};
use crate::wire::{Bundle, Created, DocumentReference};

/// HTTP client for the registry with optional bearer auth.
#[derive(Clone, Debug)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    dependent_type: String,
    dependent_search_param: String,
    dependent_field: String,
    max_search_pages: usize,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> RegistryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RegistryError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            dependent_type: config.dependent_type.clone(),
            dependent_search_param: config.dependent_search_param.clone(),
            dependent_field: config.dependent_field.clone(),
            max_search_pages: config.max_search_pages,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_to(method, self.build_url(path))
    }

    fn request_to<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let request = self.client.request(method, url).header(ACCEPT, FHIR_JSON);

        match &self.auth_token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    fn with_json<B: Serialize>(request: RequestBuilder, body: &B) -> RegistryResult<RequestBuilder> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| RegistryError::Decode(format!("Failed to encode request body: {}", e)))?;
        Ok(request.header(CONTENT_TYPE, FHIR_JSON).body(bytes))
    }

    async fn send(request: RequestBuilder) -> RegistryResult<Response> {
        request
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))
    }

    async fn rejected(response: Response) -> RegistryError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        RegistryError::Rejected { status, body }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> RegistryResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RegistryError::Decode(e.to_string()))
    }

    /// `{base}/{resource_type}/{id}` with the id as a single encoded path segment.
    fn resource_url(&self, resource_type: &str, id: &str) -> RegistryResult<Url> {
        if !is_valid_resource_id(id) {
            return Err(RegistryError::InvalidId(id.to_string()));
        }

        let mut url = Url::parse(&self.build_url(resource_type))
            .map_err(|e| RegistryError::Config(format!("Invalid registry URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| RegistryError::Config("Registry URL cannot hold a path".to_string()))?
            .push(id);
        Ok(url)
    }

    /// A next-page link, if it sits under the registry base URL.
    fn next_page_url(&self, link: &str) -> Option<Url> {
        let rest = link.strip_prefix(self.base_url.as_str())?;
        if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')) {
            return None;
        }
        Url::parse(link).ok()
    }
}

/// Pull the resource id out of a `Location` header such as
/// `http://registry/DocumentReference/42/_history/1`.
fn id_from_location(location: &str) -> Option<String> {
    let mut segments = location.split('/');
    segments.find(|s| *s == DOCUMENT_REFERENCE)?;
    segments
        .next()
        .filter(|id| is_valid_resource_id(id))
        .map(String::from)
}

#[async_trait]
impl Registry for RegistryClient {
    async fn create_metadata_record(&self, record: &MetadataRecord) -> RegistryResult<String> {
        let start = Instant::now();
        let request = Self::with_json(
            self.request(Method::POST, DOCUMENT_REFERENCE),
            &DocumentReference::from(record),
        )?;

        let response = Self::send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::rejected(response).await);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(id_from_location);

        let body = response.bytes().await?;
        let id = serde_json::from_slice::<Created>(&body)
            .ok()
            .and_then(|c| c.id)
            .filter(|id| is_valid_resource_id(id))
            .or(location)
            .ok_or_else(|| RegistryError::Rejected {
                status: status.as_u16(),
                body: "Response carried no resource id".to_string(),
            })?;

        tracing::info!(
            external_id = %id,
            attachments = record.attachments.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Registry metadata record created"
        );

        Ok(id)
    }

    async fn fetch_metadata_record(&self, external_id: &str) -> RegistryResult<MetadataRecord> {
        let start = Instant::now();
        let url = self.resource_url(DOCUMENT_REFERENCE, external_id)?;
        let response = Self::send(self.request_to(Method::GET, url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                return Err(RegistryError::NotFound(MetadataRecord::reference_for(
                    external_id,
                )));
            }
            status if !status.is_success() => return Err(Self::rejected(response).await),
            _ => {}
        }

        let doc: DocumentReference = Self::decode(response).await?;
        if doc.resource_type != DOCUMENT_REFERENCE {
            return Err(RegistryError::Decode(format!(
                "Expected {} but the registry returned {:?}",
                DOCUMENT_REFERENCE, doc.resource_type
            )));
        }
        let mut record = MetadataRecord::from(doc);
        if record.external_id.is_none() {
            record.external_id = Some(external_id.to_string());
        }

        tracing::info!(
            external_id = %external_id,
            attachments = record.attachments.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Registry metadata record fetched"
        );

        Ok(record)
    }

    async fn find_dependents_referencing(
        &self,
        external_id: &str,
    ) -> RegistryResult<DependentSearch> {
        let start = Instant::now();
        let reference = MetadataRecord::reference_for(external_id);
        let mut url = Url::parse(&self.build_url(&self.dependent_type))
            .map_err(|e| RegistryError::Config(format!("Invalid registry URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair(&self.dependent_search_param, &reference);

        let mut dependents = Vec::new();
        let mut pages = 0;
        let complete = loop {
            let response = Self::send(self.request_to(Method::GET, url)).await?;
            if !response.status().is_success() {
                return Err(Self::rejected(response).await);
            }

            let bundle: Bundle = Self::decode(response).await?;
            pages += 1;
            let next = bundle.next_page().map(String::from);
            dependents.extend(
                bundle
                    .entry
                    .into_iter()
                    .filter_map(|entry| entry.resource)
                    .filter_map(|body| DependentRecord::from_resource(body, &self.dependent_field)),
            );

            let Some(link) = next else {
                break true;
            };
            if pages >= self.max_search_pages {
                tracing::warn!(
                    external_id = %external_id,
                    pages,
                    "Dependent search stopped at the page limit"
                );
                break false;
            }
            match self.next_page_url(&link) {
                Some(next_url) => url = next_url,
                None => {
                    tracing::warn!(
                        external_id = %external_id,
                        next = %link,
                        "Dependent search next link points outside the registry"
                    );
                    break false;
                }
            }
        };

        tracing::info!(
            external_id = %external_id,
            dependent_type = %self.dependent_type,
            count = dependents.len(),
            pages,
            complete,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Registry dependents queried"
        );

        Ok(DependentSearch {
            dependents,
            complete,
        })
    }

    async fn update_dependent(&self, record: &DependentRecord) -> RegistryResult<()> {
        let start = Instant::now();
        let path = format!("{}/{}", self.dependent_type, record.id);
        let url = self.resource_url(&self.dependent_type, &record.id)?;
        let request = Self::with_json(self.request_to(Method::PUT, url), &record.body)?;

        let response = Self::send(request).await?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => return Err(RegistryError::NotFound(path)),
            status if !status.is_success() => return Err(Self::rejected(response).await),
            _ => {}
        }

        tracing::info!(
            dependent = %path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Registry dependent updated"
        );

        Ok(())
    }

    async fn delete_metadata_record(&self, external_id: &str) -> RegistryResult<()> {
        let start = Instant::now();
        let url = self.resource_url(DOCUMENT_REFERENCE, external_id)?;
        let response = Self::send(self.request_to(Method::DELETE, url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                tracing::debug!(external_id = %external_id, "Registry record already deleted");
                return Ok(());
            }
            status if !status.is_success() => return Err(Self::rejected(response).await),
            _ => {}
        }

        tracing::info!(
            external_id = %external_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Registry metadata record deleted"
        );

        Ok(())
    }
}
