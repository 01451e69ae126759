//! Reelvault Database Library
//!
//! Repository layer over Postgres. The video repository is the only consumer
//! of the `videos` table; handlers never touch the pool directly.

pub mod videos;

pub use videos::VideoRepository;
