//! Video upload handler.
//!
//! Accepts a multipart body with a single `video` field, runs it through the
//! upload pipeline, and commits the resulting storage key to the video
//! record as an opaque `bucket,key` reference.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use reelvault_core::models::VideoResponse;
use reelvault_core::{AppError, StoredVideoReference};
use reelvault_processing::PipelineError;
use reelvault_storage::ACCEPTED_MEDIA_TYPE;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;

/// Allowance for multipart boundaries and part headers on top of the file
/// bytes themselves. Also sizes the request body limit layer in routes.
pub(crate) const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Normalize MIME type by stripping parameters (e.g. "video/mp4; codecs=avc1" -> "video/mp4").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Estimate the file size from the request Content-Length. The header covers
/// the whole multipart body, so the framing allowance is subtracted before
/// the pipeline's pre-buffer size check; the running byte count during
/// buffering stays authoritative.
fn declared_file_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(|len| len.saturating_sub(MULTIPART_OVERHEAD_BYTES))
}

#[tracing::instrument(
    skip(state, headers, multipart),
    fields(user_id = %auth.user_id, video_id = %id, operation = "upload_video")
)]
pub async fn upload_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .videos
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

    if video.user_id != auth.user_id {
        return Err(AppError::Unauthorized("Not the video owner".to_string()).into());
    }

    let declared_len = declared_file_length(&headers);

    let mut committed_key: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("video") {
            continue;
        }
        if let Some(orphaned) = &committed_key {
            tracing::warn!(
                key = %orphaned,
                "duplicate video field rejected; already-stored object is orphaned"
            );
            return Err(
                AppError::InvalidInput("Duplicate video field in multipart body".to_string())
                    .into(),
            );
        }

        let media_type = normalize_mime_type(field.content_type().unwrap_or_default());
        if media_type != ACCEPTED_MEDIA_TYPE {
            return Err(AppError::InvalidInput(format!(
                "Unsupported media type: {}, expected {}",
                media_type, ACCEPTED_MEDIA_TYPE
            ))
            .into());
        }

        let body = field.map_err(|e| {
            PipelineError::Io(std::io::Error::other(format!("multipart read error: {}", e)))
        });

        let key = state
            .pipeline
            .run(Box::pin(body), declared_len, &media_type)
            .await?;
        committed_key = Some(key);
    }

    let key = committed_key
        .ok_or_else(|| AppError::InvalidInput("Missing video field".to_string()))?;

    let reference = StoredVideoReference::new(state.storage.bucket(), key.clone());
    let video = match state.videos.update_video_url(id, &reference.encode()).await {
        Ok(video) => video,
        Err(e) => {
            // The object is already in storage; the record update failed, so
            // the key is orphaned. Log it for manual reconciliation.
            tracing::error!(
                video_id = %id,
                bucket = %state.storage.bucket(),
                key = %key,
                error = %e,
                "video record update failed after upload; stored object is orphaned"
            );
            return Err(e.into());
        }
    };

    Ok(Json(VideoResponse::from_video(video, None)))
}
