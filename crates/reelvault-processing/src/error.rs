use reelvault_storage::StorageError;
use thiserror::Error;

/// Upload pipeline errors. All are terminal for the request; nothing in the
/// pipeline retries.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Payload too large: {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("No video stream found")]
    NoStreamFound,

    #[error("Remux failed: {0}")]
    RemuxFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for PipelineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedMediaType(media_type) => {
                PipelineError::UnsupportedMediaType(media_type)
            }
            other => PipelineError::UploadFailed(other.to_string()),
        }
    }
}
