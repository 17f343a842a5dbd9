//! Clinvault Media Processing Library
//!
//! Classification of uploaded payloads and thumbnail generation for raster images.
//! Everything here is synchronous and CPU-bound; `upload::ImageUploadProcessor` moves
//! the work onto the blocking pool for async callers.

pub mod error;
pub mod image;
pub mod metadata;
pub mod upload;

// Re-export commonly used types
pub use error::{ProcessingError, ProcessingResult};
pub use crate::image::{AssetClassifier, Classification, Thumbnailer};
pub use metadata::ImageMetadata;
pub use upload::ImageUploadProcessor;
