//! Video read handler.
//!
//! Parses the stored `bucket,key` reference and responds with a freshly
//! signed URL. Signed URLs are never persisted; every read mints a new one.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use reelvault_core::models::VideoResponse;
use reelvault_core::{AppError, StoredVideoReference};
use std::time::Duration;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;

/// The stored bucket must match the configured backend's bucket; presigning
/// a key against a different bucket than the reference names would mint a
/// URL for the wrong object store.
fn ensure_bucket_matches(
    reference: &StoredVideoReference,
    configured: &str,
) -> Result<(), AppError> {
    if reference.bucket != configured {
        return Err(AppError::InvalidReference(format!(
            "stored bucket {} does not match configured bucket {}",
            reference.bucket, configured
        )));
    }
    Ok(())
}

#[tracing::instrument(
    skip(state),
    fields(user_id = %auth.user_id, video_id = %id, operation = "get_video")
)]
pub async fn get_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .videos
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

    if video.user_id != auth.user_id {
        return Err(AppError::Unauthorized("Not the video owner".to_string()).into());
    }

    let signed_url = match &video.video_url {
        Some(raw) => {
            let reference = StoredVideoReference::parse(raw)?;
            ensure_bucket_matches(&reference, state.storage.bucket())?;
            let url = state
                .storage
                .get_presigned_url(
                    &reference.key,
                    Duration::from_secs(state.config.signed_url_ttl_secs),
                )
                .await?;
            Some(url)
        }
        None => None,
    };

    Ok(Json(VideoResponse::from_video(video, signed_url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_bucket_accepted() {
        let reference = StoredVideoReference::new("reelvault-media", "landscape/abc.mp4");
        assert!(ensure_bucket_matches(&reference, "reelvault-media").is_ok());
    }

    #[test]
    fn test_mismatched_bucket_rejected() {
        let reference = StoredVideoReference::new("some-other-bucket", "landscape/abc.mp4");
        let err = ensure_bucket_matches(&reference, "reelvault-media").unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));
    }
}
