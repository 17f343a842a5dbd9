//! Shared key validation for the asset store.
//!
//! Key format: a single filename inside the asset directory, never a path.

use crate::traits::{StorageError, StorageResult};

/// Check that `key` names a file directly inside the asset directory.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key == "." {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }

    if key.contains('/') || key.contains('\\') || key.contains("..") || key.contains('\0') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }

    Ok(())
}

/// Derive the stored filename from a public URL: the last path segment, without
/// query string or fragment. Returns `None` when no valid key can be derived.
pub fn filename_from_url(url: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let mut path = without_fragment.split('?').next().unwrap_or(without_fragment);

    // Drop scheme and authority so a bare host is never mistaken for a filename.
    if let Some(idx) = path.find("://") {
        let rest = &path[idx + 3..];
        path = &rest[rest.find('/')?..];
    }

    let name = path.trim_end_matches('/').rsplit('/').next()?;

    if validate_key(name).is_err() {
        return None;
    }

    Some(name.to_string())
}
