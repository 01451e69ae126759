//! Reelvault Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! stored-reference encoding shared across all Reelvault components.

pub mod config;
pub mod error;
pub mod models;
pub mod reference;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use reference::StoredVideoReference;
pub use storage_types::StorageBackend;
