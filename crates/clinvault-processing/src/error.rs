/// Image processing errors
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Image processing task failed: {0}")]
    Task(String),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
