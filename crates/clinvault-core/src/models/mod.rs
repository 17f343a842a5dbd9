//! Data models for the application
//!
//! `asset` holds the per-upload types that never leave this process; `registry` holds
//! the records owned by the external registry.

mod asset;
mod registry;

pub use asset::*;
pub use registry::*;
