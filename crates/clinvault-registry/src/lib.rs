//! HTTP client for the clinical document registry.
//!
//! Metadata records are stored as `DocumentReference` resources whose attachments carry
//! the public URLs of an asset's files. Dependent records (by default `DiagnosticReport`)
//! point at them from a configurable array field. The pipelines depend on the
//! [`Registry`] trait; [`RegistryClient`] is the reqwest implementation.

pub mod client;
pub mod error;
pub mod traits;
mod wire;

pub use client::RegistryClient;
pub use error::{RegistryError, RegistryResult};
pub use traits::{DependentSearch, Registry};
