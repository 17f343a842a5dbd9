//! Clinvault Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every clinvault component: the asset store, the registry client and the pipelines.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, RegistryConfig, StorageConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    is_valid_resource_id, AssetRecord, Attachment, DependentRecord, ImageFormat, MetadataRecord,
    UploadRequest, UploadResponse,
};
