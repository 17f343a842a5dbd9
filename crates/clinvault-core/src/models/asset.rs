use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Raster formats accepted as images. Anything else is stored as an opaque file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::Webp,
    ];

    /// Extension used when naming stored files.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

/// Raw upload as handed over by the inbound surface.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    /// Name the caller gave the file; only its extension is used.
    pub original_filename: Option<String>,
    /// MIME type the caller declared; used for non-images only.
    pub content_type: Option<String>,
    pub subject_ref: Option<String>,
    pub author_ref: Option<String>,
}

impl UploadRequest {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.original_filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_subject(mut self, subject_ref: impl Into<String>) -> Self {
        self.subject_ref = Some(subject_ref.into());
        self
    }

    pub fn with_author(mut self, author_ref: impl Into<String>) -> Self {
        self.author_ref = Some(author_ref.into());
        self
    }

    /// Lowercased extension of the original filename, if any.
    pub fn original_extension(&self) -> Option<String> {
        let name = self.original_filename.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }
}

/// Everything derived for one upload. Built per request; only its effects persist.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub unique_id: String,
    pub is_image: bool,
    pub format: Option<ImageFormat>,
    pub dimensions: Option<(u32, u32)>,
    pub stored_filename: String,
    pub thumbnail_filename: Option<String>,
    pub size_bytes: u64,
    pub content_type: String,
    pub relative_path: String,
    pub thumbnail_relative_path: Option<String>,
    pub public_url: String,
    pub thumbnail_url: Option<String>,
}

/// Result of a completed upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub filename: String,
    pub size: u64,
    pub path: String,
    pub thumbnail_path: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub external_id: String,
    pub delete_url: String,
    pub content_type: String,
    pub is_image: bool,
    pub format: Option<ImageFormat>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl UploadResponse {
    pub fn from_asset(asset: &AssetRecord, external_id: String, delete_url: String) -> Self {
        Self {
            filename: asset.stored_filename.clone(),
            size: asset.size_bytes,
            path: asset.relative_path.clone(),
            thumbnail_path: asset.thumbnail_relative_path.clone(),
            url: asset.public_url.clone(),
            thumbnail_url: asset.thumbnail_url.clone(),
            external_id,
            delete_url,
            content_type: asset.content_type.clone(),
            is_image: asset.is_image,
            format: asset.format,
            width: asset.dimensions.map(|(w, _)| w),
            height: asset.dimensions.map(|(_, h)| h),
        }
    }
}
