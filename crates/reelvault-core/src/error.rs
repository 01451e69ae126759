//! Error types module
//!
//! This module provides the core error types used throughout the Reelvault
//! application. All errors are unified under the `AppError` enum, which covers
//! authentication, persistence, storage, and pipeline failures.

use std::io;

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

/// Metadata for error responses - defines how an error should be presented.
/// This trait allows errors to self-describe their HTTP response characteristics.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PAYLOAD_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details must be hidden from clients (subprocess stderr,
    /// local file paths, backend internals)
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("No video stream found")]
    NoStreamFound,

    #[error("Remux failed: {0}")]
    RemuxFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Invalid stored reference: {0}")]
    InvalidReference(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::ProbeFailed(_) => (500, "PROBE_FAILED", true, LogLevel::Error),
        AppError::NoStreamFound => (400, "NO_STREAM_FOUND", false, LogLevel::Debug),
        AppError::RemuxFailed(_) => (500, "REMUX_FAILED", true, LogLevel::Error),
        AppError::UploadFailed(_) => (500, "UPLOAD_FAILED", true, LogLevel::Error),
        AppError::PersistenceFailed(_) => (500, "PERSISTENCE_FAILED", true, LogLevel::Error),
        AppError::InvalidReference(_) => (500, "INVALID_REFERENCE", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::ProbeFailed(_) => "ProbeFailed",
            AppError::NoStreamFound => "NoStreamFound",
            AppError::RemuxFailed(_) => "RemuxFailed",
            AppError::UploadFailed(_) => "UploadFailed",
            AppError::PersistenceFailed(_) => "PersistenceFailed",
            AppError::InvalidReference(_) => "InvalidReference",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        // Sensitive variants carry subprocess stderr or internal paths in
        // their payload; clients only ever see the generic message.
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::NoStreamFound => "No video stream found in uploaded file".to_string(),
            AppError::ProbeFailed(_) => "Couldn't inspect video".to_string(),
            AppError::RemuxFailed(_) => "Couldn't process video for fast start".to_string(),
            AppError::UploadFailed(_) => "Couldn't upload video".to_string(),
            AppError::PersistenceFailed(_) => "Couldn't update video record".to_string(),
            AppError::InvalidReference(_) => "Stored video reference is invalid".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
