//! Async entry points used by the upload pipeline.

pub mod image_processor;

pub use image_processor::ImageUploadProcessor;
