//! Fixed values shared across crates.

/// Edge length, in pixels, of every generated thumbnail.
pub const THUMBNAIL_SIZE: u32 = 128;

/// Suffix inserted between the unique id and the extension of a thumbnail filename.
pub const THUMBNAIL_SUFFIX: &str = "_thumb";

/// Content type recorded for non-image payloads when the caller supplies none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File kept in the asset directory so it stays tracked when otherwise empty.
pub const DEFAULT_RESERVED_MARKER: &str = ".gitkeep";

/// Number of random bytes behind each generated asset id.
pub const UNIQUE_ID_BYTES: usize = 16;

/// Longest caller-supplied extension kept when naming a non-image asset.
pub const MAX_EXTENSION_LEN: usize = 16;

/// Registry resource type holding asset metadata.
pub const DOCUMENT_REFERENCE: &str = "DocumentReference";

/// Longest id the registry assigns to a resource.
pub const MAX_RESOURCE_ID_LEN: usize = 64;

/// Media type spoken by the registry.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Attachment titles.
pub const FULL_IMAGE_TITLE: &str = "full-image";
pub const THUMBNAIL_TITLE: &str = "thumbnail";
pub const FILE_TITLE: &str = "file";
