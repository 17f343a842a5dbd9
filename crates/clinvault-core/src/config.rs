//! Configuration module
//!
//! Configuration is read once from the environment (and an optional `.env` file) and
//! handed to each component as an explicit struct. Nothing reads the environment after
//! start-up.

use std::env;
use std::path::PathBuf;

use crate::constants::DEFAULT_RESERVED_MARKER;

const MAX_UPLOAD_SIZE_MB: usize = 50;
const REGISTRY_TIMEOUT_SECS: u64 = 30;
const REGISTRY_MAX_SEARCH_PAGES: usize = 20;

/// Asset directory and the addresses files are published under.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub path: PathBuf,
    /// Base for public URLs, e.g. `http://localhost:8080/uploads`.
    pub public_base_url: String,
    /// Prefix for the relative paths returned to callers, e.g. `uploads`.
    pub relative_dir: String,
    /// File that survives a purge.
    pub reserved_marker: String,
}

impl StorageConfig {
    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), filename)
    }

    pub fn relative_path(&self, filename: &str) -> String {
        let dir = self.relative_dir.trim_matches('/');
        if dir.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", dir, filename)
        }
    }
}

/// External registry endpoint and how dependents are located.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
    /// Resource type of records that reference metadata records.
    pub dependent_type: String,
    /// Search parameter used to query dependents by reference.
    pub dependent_search_param: String,
    /// Array field inside a dependent holding its references.
    pub dependent_field: String,
    /// Search result pages followed before a dependent lookup is reported incomplete.
    pub max_search_pages: usize,
}

impl RegistryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout_secs: REGISTRY_TIMEOUT_SECS,
            dependent_type: "DiagnosticReport".to_string(),
            dependent_search_param: "media".to_string(),
            dependent_field: "media".to_string(),
            max_search_pages: REGISTRY_MAX_SEARCH_PAGES,
        }
    }
}

/// Upload limits and the links returned after an upload.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
    /// Base for delete links, e.g. `/assets/delete`.
    pub delete_url_base: String,
}

impl UploadConfig {
    pub fn delete_url(&self, external_id: &str) -> String {
        format!("{}/{}", self.delete_url_base.trim_end_matches('/'), external_id)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            delete_url_base: "/assets/delete".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub storage: StorageConfig,
    pub registry: RegistryConfig,
    pub upload: UploadConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let max_upload_size_mb = var("MAX_UPLOAD_SIZE_MB")
            .map(|s| {
                s.trim()
                    .parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a valid number"))
            })
            .transpose()?
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let storage = StorageConfig {
            path: PathBuf::from(var("ASSET_STORAGE_PATH").unwrap_or_else(|| "./uploads".into())),
            public_base_url: var("ASSET_PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080/uploads".to_string()),
            relative_dir: var("ASSET_RELATIVE_DIR").unwrap_or_else(|| "uploads".to_string()),
            reserved_marker: var("ASSET_RESERVED_MARKER")
                .unwrap_or_else(|| DEFAULT_RESERVED_MARKER.to_string()),
        };

        let mut registry = RegistryConfig::new(
            var("REGISTRY_BASE_URL")
                .ok_or_else(|| anyhow::anyhow!("REGISTRY_BASE_URL must be set"))?,
        );
        registry.auth_token = var("REGISTRY_AUTH_TOKEN");
        registry.timeout_secs = var("REGISTRY_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(REGISTRY_TIMEOUT_SECS);
        if let Some(t) = var("REGISTRY_DEPENDENT_TYPE") {
            registry.dependent_type = t;
        }
        if let Some(p) = var("REGISTRY_DEPENDENT_SEARCH_PARAM") {
            registry.dependent_search_param = p;
        }
        if let Some(f) = var("REGISTRY_DEPENDENT_FIELD") {
            registry.dependent_field = f;
        }
        registry.max_search_pages = var("REGISTRY_MAX_SEARCH_PAGES")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(REGISTRY_MAX_SEARCH_PAGES);

        let max_upload_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let upload = UploadConfig {
            max_upload_bytes,
            delete_url_base: var("ASSET_DELETE_URL_BASE")
                .unwrap_or_else(|| "/assets/delete".to_string()),
        };

        let config = Config {
            environment,
            storage,
            registry,
            upload,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(
            self.environment.to_lowercase().as_str(),
            "production" | "prod"
        )
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let url = self.registry.base_url.to_lowercase();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "REGISTRY_BASE_URL must be an http(s) URL"
            ));
        }

        if self.storage.path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("ASSET_STORAGE_PATH must not be empty"));
        }

        if self.storage.reserved_marker.contains('/') {
            return Err(anyhow::anyhow!(
                "ASSET_RESERVED_MARKER must be a plain filename"
            ));
        }

        if self.upload.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than zero"));
        }

        if self.registry.max_search_pages == 0 {
            return Err(anyhow::anyhow!(
                "REGISTRY_MAX_SEARCH_PAGES must be greater than zero"
            ));
        }

        if self.registry.timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "REGISTRY_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(())
    }
}
