//! Asset classifier - decides whether a payload is an allow-listed raster image

use crate::image::from_decoder_format;
use crate::metadata::ImageMetadata;
use clinvault_core::ImageFormat;
use image::{GenericImageView, ImageReader};
use std::io::Cursor;

/// Outcome of classifying a payload. Not being an image is a normal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Image(ImageMetadata),
    Other,
}

impl Classification {
    pub fn is_image(&self) -> bool {
        matches!(self, Classification::Image(_))
    }

    pub fn format(&self) -> Option<ImageFormat> {
        match self {
            Classification::Image(meta) => Some(meta.format),
            Classification::Other => None,
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Classification::Image(meta) => Some(meta.dimensions()),
            Classification::Other => None,
        }
    }
}

pub struct AssetClassifier;

impl AssetClassifier {
    /// Classify a payload. Decodes it fully so truncated or corrupt images fall back to
    /// `Other` instead of being stored as images.
    pub fn classify(data: &[u8]) -> Classification {
        let reader = match ImageReader::new(Cursor::new(data)).with_guessed_format() {
            Ok(reader) => reader,
            Err(e) => {
                tracing::debug!(error = %e, "Could not read payload, not an image");
                return Classification::Other;
            }
        };

        let Some(decoder_format) = reader.format() else {
            tracing::debug!(size_bytes = data.len(), "Unrecognised payload, not an image");
            return Classification::Other;
        };

        let Some(format) = from_decoder_format(decoder_format) else {
            tracing::debug!(format = ?decoder_format, "Image format outside allow-list");
            return Classification::Other;
        };

        match reader.decode() {
            Ok(img) => {
                let (width, height) = img.dimensions();
                Classification::Image(ImageMetadata {
                    format,
                    width,
                    height,
                })
            }
            Err(e) => {
                tracing::debug!(error = %e, format = %format, "Image failed to decode");
                Classification::Other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: image::ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    fn rgba(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255])))
    }

    fn rgb(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 128, 255])))
    }

    #[test]
    fn test_classify_png() {
        let data = encode(rgba(100, 60), image::ImageFormat::Png);
        let result = AssetClassifier::classify(&data);

        assert!(result.is_image());
        assert_eq!(result.format(), Some(ImageFormat::Png));
        assert_eq!(result.dimensions(), Some((100, 60)));
    }

    #[test]
    fn test_classify_all_allowed_formats() {
        let cases = [
            (encode(rgb(20, 10), image::ImageFormat::Jpeg), ImageFormat::Jpeg),
            (encode(rgba(20, 10), image::ImageFormat::Png), ImageFormat::Png),
            (encode(rgba(20, 10), image::ImageFormat::Gif), ImageFormat::Gif),
            (encode(rgba(20, 10), image::ImageFormat::WebP), ImageFormat::Webp),
        ];

        for (data, expected) in cases {
            let result = AssetClassifier::classify(&data);
            assert_eq!(result.format(), Some(expected), "format {}", expected);
            assert_eq!(result.dimensions(), Some((20, 10)));
        }
    }

    #[test]
    fn test_classify_plain_text() {
        let result = AssetClassifier::classify(b"just some notes\n");
        assert_eq!(result, Classification::Other);
        assert!(!result.is_image());
        assert_eq!(result.format(), None);
    }

    #[test]
    fn test_classify_pdf_is_not_image() {
        let result = AssetClassifier::classify(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj\n");
        assert_eq!(result, Classification::Other);
    }

    #[test]
    fn test_classify_truncated_png() {
        let data = encode(rgba(50, 50), image::ImageFormat::Png);
        let truncated = &data[..45];
        assert_eq!(AssetClassifier::classify(truncated), Classification::Other);
    }

    #[test]
    fn test_classify_png_signature_only() {
        let data = b"\x89PNG\r\n\x1a\ngarbage";
        assert_eq!(AssetClassifier::classify(data), Classification::Other);
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(AssetClassifier::classify(&[]), Classification::Other);
    }
}
