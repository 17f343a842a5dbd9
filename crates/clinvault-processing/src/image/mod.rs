//! Image processing module
//!
//! - Classification of arbitrary payloads against the image allow-list (classifier)
//! - Fixed-size thumbnail derivation with EXIF carry-over (thumbnail)

pub mod classifier;
pub mod thumbnail;

pub use classifier::{AssetClassifier, Classification};
pub use thumbnail::Thumbnailer;

use clinvault_core::ImageFormat;

/// Map a decoder format onto the allow-list. Formats outside it map to `None`.
pub(crate) fn from_decoder_format(format: image::ImageFormat) -> Option<ImageFormat> {
    match format {
        image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
        image::ImageFormat::Png => Some(ImageFormat::Png),
        image::ImageFormat::Gif => Some(ImageFormat::Gif),
        image::ImageFormat::WebP => Some(ImageFormat::Webp),
        _ => None,
    }
}

pub(crate) fn to_decoder_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Gif => image::ImageFormat::Gif,
        ImageFormat::Webp => image::ImageFormat::WebP,
    }
}
