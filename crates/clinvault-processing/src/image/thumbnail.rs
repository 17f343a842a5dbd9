//! Thumbnail derivation
//!
//! Every thumbnail is exactly `THUMBNAIL_SIZE` x `THUMBNAIL_SIZE`: the image is scaled to
//! cover the square and the overflow is centre-cropped, so aspect ratio never changes the
//! output size. The EXIF block of the original is carried over for containers that hold
//! one (JPEG, PNG, WebP).

use crate::error::{ProcessingError, ProcessingResult};
use crate::image::to_decoder_format;
use bytes::Bytes;
use clinvault_core::constants::THUMBNAIL_SIZE;
use clinvault_core::ImageFormat;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use img_parts::{DynImage, ImageEXIF};
use std::io::Cursor;

pub struct Thumbnailer;

impl Thumbnailer {
    /// Produce a `THUMBNAIL_SIZE` square thumbnail encoded in `format`.
    pub fn generate(data: &[u8], format: ImageFormat) -> ProcessingResult<Vec<u8>> {
        let img = ImageReader::with_format(Cursor::new(data), to_decoder_format(format))
            .decode()
            .map_err(ProcessingError::Decode)?;

        let thumb = img.resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

        // JPEG has no alpha channel; the other encoders take RGBA.
        let thumb = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(thumb.to_rgb8()),
            ImageFormat::Png => thumb,
            ImageFormat::Gif | ImageFormat::Webp => DynamicImage::ImageRgba8(thumb.to_rgba8()),
        };

        let mut buffer = Vec::new();
        thumb
            .write_to(&mut Cursor::new(&mut buffer), to_decoder_format(format))
            .map_err(ProcessingError::Encode)?;

        tracing::debug!(
            format = %format,
            source_width = img.width(),
            source_height = img.height(),
            size_bytes = buffer.len(),
            "Thumbnail generated"
        );

        Ok(Self::carry_exif(data, buffer))
    }

    /// Copy the EXIF block of `original` into `thumbnail`. Returns the thumbnail
    /// unchanged when either side has no EXIF-capable container or the original has
    /// no EXIF.
    pub fn carry_exif(original: &[u8], thumbnail: Vec<u8>) -> Vec<u8> {
        let exif = match DynImage::from_bytes(Bytes::copy_from_slice(original)) {
            Ok(Some(source)) => source.exif(),
            _ => None,
        };
        let Some(exif) = exif else {
            return thumbnail;
        };

        match DynImage::from_bytes(Bytes::from(thumbnail.clone())) {
            Ok(Some(mut target)) => {
                target.set_exif(Some(exif));
                target.encoder().bytes().to_vec()
            }
            _ => thumbnail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::AssetClassifier;
    use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
    use img_parts::jpeg::Jpeg;

    fn encode(img: DynamicImage, format: image::ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    fn fixture(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = match format {
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 200, 30])))
            }
            _ => DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                width,
                height,
                Rgba([10, 200, 30, 255]),
            )),
        };
        encode(img, to_decoder_format(format))
    }

    fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
        image::load_from_memory(data).unwrap().dimensions()
    }

    #[test]
    fn test_thumbnail_is_square_for_every_format_and_aspect() {
        let sizes = [(50, 50), (400, 100), (30, 900), (1, 1), (128, 128), (129, 127)];

        for format in ImageFormat::ALL {
            for (w, h) in sizes {
                let data = fixture(w, h, format);
                let thumb = Thumbnailer::generate(&data, format).unwrap();

                assert_eq!(
                    decoded_dimensions(&thumb),
                    (THUMBNAIL_SIZE, THUMBNAIL_SIZE),
                    "{} {}x{}",
                    format,
                    w,
                    h
                );
                assert_eq!(AssetClassifier::classify(&thumb).format(), Some(format));
            }
        }
    }

    #[test]
    fn test_thumbnail_rejects_undecodable() {
        let result = Thumbnailer::generate(b"not an image", ImageFormat::Png);
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }

    #[test]
    fn test_carry_exif_jpeg() {
        let original = fixture(64, 32, ImageFormat::Jpeg);
        let exif = Bytes::from_static(b"MM\0*\0\0\0\x08\0\0");

        let mut jpeg = Jpeg::from_bytes(Bytes::from(original)).unwrap();
        jpeg.set_exif(Some(exif.clone()));
        assert_eq!(jpeg.exif(), Some(exif.clone()));
        let original = jpeg.encoder().bytes().to_vec();

        let thumb = Thumbnailer::generate(&original, ImageFormat::Jpeg).unwrap();
        let parsed = Jpeg::from_bytes(Bytes::from(thumb.clone())).unwrap();

        assert_eq!(parsed.exif(), Some(exif));
        assert_eq!(decoded_dimensions(&thumb), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }

    #[test]
    fn test_carry_exif_png_and_webp() {
        let exif = Bytes::from_static(b"MM\0*\0\0\0\x08\0\0");

        for format in [ImageFormat::Png, ImageFormat::Webp] {
            let mut source = DynImage::from_bytes(Bytes::from(fixture(64, 32, format)))
                .unwrap()
                .unwrap();
            source.set_exif(Some(exif.clone()));
            let original = source.encoder().bytes().to_vec();

            let thumb = Thumbnailer::generate(&original, format).unwrap();
            let parsed = DynImage::from_bytes(Bytes::from(thumb.clone()))
                .unwrap()
                .unwrap();

            assert_eq!(parsed.exif(), Some(exif.clone()), "{}", format);
            assert_eq!(decoded_dimensions(&thumb), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
            assert_eq!(AssetClassifier::classify(&thumb).format(), Some(format));
        }
    }

    #[test]
    fn test_carry_exif_without_exif_is_noop() {
        let original = fixture(10, 10, ImageFormat::Png);
        let thumb = fixture(5, 5, ImageFormat::Png);
        assert_eq!(Thumbnailer::carry_exif(&original, thumb.clone()), thumb);
    }

    #[test]
    fn test_carry_exif_gif_is_noop() {
        let original = fixture(10, 10, ImageFormat::Gif);
        let thumb = fixture(5, 5, ImageFormat::Gif);
        assert_eq!(Thumbnailer::carry_exif(&original, thumb.clone()), thumb);
    }
}
