//! Clinvault Storage Library
//!
//! This crate provides the asset store abstraction and its local filesystem
//! implementation.
//!
//! # Key format
//!
//! The asset directory is flat. A storage key is a bare filename:
//!
//! - originals: `{unique_id}.{ext}`
//! - thumbnails: `{unique_id}_thumb.{ext}`
//!
//! Keys must not be empty, contain path separators or `..`. Key checks are centralized
//! in the `keys` module so the store and the pipelines agree on what is addressable.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_store;
pub use keys::{filename_from_url, validate_key};
pub use local::LocalStorage;
pub use traits::{AssetStore, StorageError, StorageResult};
