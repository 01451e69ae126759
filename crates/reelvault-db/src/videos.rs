use chrono::{DateTime, Utc};
use reelvault_core::models::Video;
use reelvault_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Row shape for the `videos` table.
#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            video_url: row.video_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn db_error(err: sqlx::Error) -> AppError {
    AppError::PersistenceFailed(format!("Database error: {}", err))
}

/// Repository for video records.
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "insert"))]
    pub async fn create(&self, user_id: Uuid, title: String) -> Result<Video, AppError> {
        let now = Utc::now();
        let row: VideoRow = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            INSERT INTO videos (id, user_id, title, video_url, created_at, updated_at)
            VALUES ($1, $2, $3, NULL, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&title)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            "SELECT * FROM videos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    /// Commit a stored reference to a video record. The reference is the
    /// opaque `bucket,key` encoding, never a signed URL.
    #[tracing::instrument(skip(self, video_url), fields(db.table = "videos", db.operation = "update"))]
    pub async fn update_video_url(&self, id: Uuid, video_url: &str) -> Result<Video, AppError> {
        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            UPDATE videos
            SET video_url = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(video_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }
}
