//! Reelvault Storage Library
//!
//! This crate provides the storage abstraction and implementations for
//! Reelvault: the `Storage` trait, an S3 backend, a local-filesystem backend
//! for development and tests, and the orientation-partitioned object key
//! builder.
//!
//! # Object key format
//!
//! Video objects are stored under `{orientation}/{token}.{extension}` where
//! `token` is 32 bytes of CSPRNG output encoded base64 URL-safe without
//! padding. Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{video_object_key, ACCEPTED_MEDIA_TYPE};
pub use local::LocalStorage;
pub use reelvault_core::StorageBackend;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
