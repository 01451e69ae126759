//! Application state shared across handlers.

use reelvault_core::Config;
use reelvault_db::VideoRepository;
use reelvault_processing::UploadPipeline;
use reelvault_storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: VideoRepository,
    pub storage: Arc<dyn Storage>,
    pub pipeline: Arc<UploadPipeline>,
}
