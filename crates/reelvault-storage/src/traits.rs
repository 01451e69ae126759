//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use reelvault_core::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The upload pipeline and the signed-URL read path work against it without
/// coupling to a specific backend.
///
/// **Key format:** `{orientation}/{token}.{extension}` — see the crate root
/// documentation and the `keys` module.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a byte buffer under the given key, tagged with a content type.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Upload a local file's contents under the given key.
    ///
    /// Used by the pipeline to ship the rewritten temp file; the file itself
    /// stays owned (and cleaned up) by the caller.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()>;

    /// Delete an object by key. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Generate a time-bounded URL for direct GET access.
    ///
    /// Pure function of (key, duration, backend credentials); generated
    /// fresh on every read and never persisted.
    async fn get_presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Bucket identifier this backend writes into (used when composing the
    /// stored reference).
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
