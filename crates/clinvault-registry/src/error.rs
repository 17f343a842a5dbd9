use clinvault_core::AppError;
use thiserror::Error;

/// Registry call failures
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry record not found: {0}")]
    NotFound(String),

    #[error("Invalid registry resource id: {0:?}")]
    InvalidId(String),

    #[error("Registry rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Registry transport error: {0}")]
    Transport(String),

    #[error("Failed to decode registry response: {0}")]
    Decode(String),

    #[error("Registry client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RegistryError::Decode(e.to_string())
        } else {
            RegistryError::Transport(e.to_string())
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Context-free mapping used on read paths. Creation failures are mapped by the upload
/// pipeline, which reports a rejection as `AppError::Registration`.
impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(what) => AppError::NotFound(what),
            RegistryError::InvalidId(id) => {
                AppError::InvalidId(format!("Invalid registry resource id: {:?}", id))
            }
            RegistryError::Config(msg) => AppError::Config(msg),
            other => AppError::Transport(other.to_string()),
        }
    }
}
