//! Identity allocation and file naming for uploaded assets.

use clinvault_core::constants::{MAX_EXTENSION_LEN, THUMBNAIL_SUFFIX, UNIQUE_ID_BYTES};
use rand::Rng;

pub struct IdentityAllocator;

impl IdentityAllocator {
    /// 16 random bytes from the thread-local CSPRNG, hex encoded (32 lowercase chars).
    pub fn unique_id() -> String {
        let mut rng = rand::rng();
        let bytes: [u8; UNIQUE_ID_BYTES] = rng.random();
        hex::encode(bytes)
    }

    /// Keep ASCII alphanumerics only, lowercased, at most `MAX_EXTENSION_LEN` chars.
    pub fn sanitize_extension(extension: &str) -> String {
        extension
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .take(MAX_EXTENSION_LEN)
            .collect()
    }

    /// `{unique_id}.{ext}`, or bare `{unique_id}` when the extension is empty.
    pub fn original_filename(unique_id: &str, extension: &str) -> String {
        let extension = Self::sanitize_extension(extension);
        if extension.is_empty() {
            unique_id.to_string()
        } else {
            format!("{}.{}", unique_id, extension)
        }
    }

    pub fn thumbnail_filename(unique_id: &str, extension: &str) -> String {
        let extension = Self::sanitize_extension(extension);
        if extension.is_empty() {
            format!("{}{}", unique_id, THUMBNAIL_SUFFIX)
        } else {
            format!("{}{}.{}", unique_id, THUMBNAIL_SUFFIX, extension)
        }
    }
}
