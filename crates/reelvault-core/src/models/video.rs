use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted video record.
///
/// `video_url` holds the opaque stored reference (`bucket,key`) once an
/// upload has been committed; it is `None` for records without media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API response shape for a video.
///
/// `url` carries a freshly generated signed URL, never the stored reference;
/// signed URLs are regenerated on every read and never persisted.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    /// Build a response with the given signed URL (or none when the record
    /// has no stored media yet).
    pub fn from_video(video: Video, signed_url: Option<String>) -> Self {
        VideoResponse {
            id: video.id,
            title: video.title,
            url: signed_url,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}
