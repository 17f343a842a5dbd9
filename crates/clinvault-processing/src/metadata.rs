//! Image metadata extracted during classification

use clinvault_core::ImageFormat;
use serde::{Deserialize, Serialize};

/// Image metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageMetadata {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_metadata_serialization() {
        let metadata = ImageMetadata {
            format: ImageFormat::Webp,
            width: 1920,
            height: 1080,
        };

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"webp\""));

        let deserialized: ImageMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata, deserialized);
        assert_eq!(deserialized.dimensions(), (1920, 1080));
    }
}
