use clinvault_core::ImageFormat;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// Encode a solid image of the given size in `format`.
pub fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let (img, target) = match format {
        ImageFormat::Jpeg => (
            DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 30, 30]))),
            image::ImageFormat::Jpeg,
        ),
        ImageFormat::Png => (rgba(width, height), image::ImageFormat::Png),
        ImageFormat::Gif => (rgba(width, height), image::ImageFormat::Gif),
        ImageFormat::Webp => (rgba(width, height), image::ImageFormat::WebP),
    };

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), target).unwrap();
    buffer
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    create_test_image(width, height, ImageFormat::Png)
}

fn rgba(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([30, 60, 200, 255]),
    ))
}

/// Dimensions of an encoded image.
pub fn image_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).unwrap();
    (img.width(), img.height())
}
