//! Route definitions and middleware layers.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use reelvault_core::Config;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::handlers::video_upload::MULTIPART_OVERHEAD_BYTES;
use crate::state::AppState;

pub fn setup_routes(config: &Config, state: AppState) -> Router {
    let body_limit = (config.max_video_size_bytes + MULTIPART_OVERHEAD_BYTES) as usize;

    Router::new()
        .route("/healthz", get(handlers::health::healthz))
        .route("/api/videos/{id}", post(handlers::video_upload::upload_video))
        .route("/api/videos/{id}", get(handlers::video_get::get_video))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
