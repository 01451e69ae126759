//! Application setup and initialization
//!
//! Initialization logic extracted from main.rs for better organization and
//! testability.

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::Result;
use reelvault_core::Config;
use reelvault_db::VideoRepository;
use reelvault_processing::{FfmpegRewriter, FfprobeInspector, UploadPipeline};
use reelvault_storage::create_storage;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(AppState, axum::Router)> {
    let pool = database::setup_database(&config).await?;

    let storage = create_storage(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;
    tracing::info!(
        backend = %config.storage_backend,
        bucket = %storage.bucket(),
        "Storage initialized"
    );

    let pipeline = Arc::new(UploadPipeline::new(
        Arc::new(FfprobeInspector::new(config.ffprobe_path.clone())),
        Arc::new(FfmpegRewriter::new(config.ffmpeg_path.clone())),
        storage.clone(),
        config.max_video_size_bytes,
    ));

    let state = AppState {
        config: config.clone(),
        videos: VideoRepository::new(pool),
        storage,
        pipeline,
    };

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
