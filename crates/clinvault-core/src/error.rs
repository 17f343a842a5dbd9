//! Error types module
//!
//! All pipeline failures are unified under [`AppError`]. Lower layers (storage,
//! registry client) keep their own error enums and are mapped into `AppError` where a
//! pipeline decides whether a failure is fatal.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their response characteristics
pub trait ErrorMetadata {
    /// HTTP-equivalent status code
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from callers
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Registry rejected record: {0}")]
    Registration(String),

    #[error("Registry transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Remote resource for {external_id} may already be gone, local cleanup incomplete: {reason}")]
    LocalCleanupIncomplete { external_id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::NoFile => (
            400,
            "NO_FILE",
            false,
            Some("Attach a non-empty file and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Upload a smaller file"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidId(_) => (
            400,
            "INVALID_ID",
            false,
            Some("Provide the registry id of the record to delete"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Registration(_) => (
            502,
            "REGISTRATION_ERROR",
            true,
            Some("Retry the upload; the registry did not accept the record"),
            true,
            LogLevel::Error,
        ),
        AppError::Transport(_) => (
            502,
            "TRANSPORT_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::LocalCleanupIncomplete { .. } => (
            500,
            "LOCAL_CLEANUP_INCOMPLETE",
            false,
            Some("Contact support; local files may need manual removal"),
            true,
            LogLevel::Error,
        ),
        AppError::Config(_) => (
            500,
            "CONFIG_ERROR",
            false,
            Some("Check the service configuration"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NoFile => "No file uploaded".to_string(),
            AppError::PayloadTooLarge { max, .. } => {
                format!("File exceeds the maximum size of {} bytes", max)
            }
            AppError::InvalidId(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Registration(_) => "Failed to register the uploaded file".to_string(),
            AppError::Transport(_) => "Failed to reach the document registry".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::LocalCleanupIncomplete { .. } => {
                "Remote resource may already be gone, local cleanup incomplete".to_string()
            }
            AppError::Config(_) => "Service is misconfigured".to_string(),
        }
    }
}
