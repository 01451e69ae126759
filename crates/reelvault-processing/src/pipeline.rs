//! Upload pipeline orchestration.
//!
//! Sequences the upload stages: buffer the request body to scratch space,
//! probe the geometry, rewrite for fast start, and push the result to object
//! storage. Every scratch file is registered for cleanup before it is
//! created, and cleanup runs exactly once whether the pipeline succeeds or
//! fails partway.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::faststart::FastStartRewriter;
use crate::probe::MediaInspector;
use reelvault_core::models::Orientation;
use reelvault_storage::{video_object_key, Storage};

/// Where an upload job currently is. Stages only advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadStage {
    Received,
    BufferedLocally,
    Inspected,
    Rewritten,
    Uploaded,
    Committed,
}

/// Per-request state: the current stage and the scratch paths owed to
/// cleanup.
struct UploadJob {
    stage: UploadStage,
    cleanup: Vec<PathBuf>,
}

impl UploadJob {
    fn new() -> Self {
        Self {
            stage: UploadStage::Received,
            cleanup: Vec::new(),
        }
    }

    fn advance(&mut self, stage: UploadStage) {
        tracing::debug!(from = ?self.stage, to = ?stage, "upload stage advanced");
        self.stage = stage;
    }

    /// Register a scratch path for removal. Must happen before the file is
    /// created so a failure mid-write still gets cleaned up.
    fn track(&mut self, path: PathBuf) {
        self.cleanup.push(path);
    }

    /// Remove every tracked path. Draining means a second call is a no-op,
    /// so cleanup cannot double-remove.
    async fn cleanup(&mut self) {
        for path in self.cleanup.drain(..) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove scratch file");
                }
            }
        }
    }
}

/// The upload processing pipeline.
///
/// Holds the inspector, rewriter, and storage behind trait objects so tests
/// can run the full orchestration without external tools.
pub struct UploadPipeline {
    inspector: Arc<dyn MediaInspector>,
    rewriter: Arc<dyn FastStartRewriter>,
    storage: Arc<dyn Storage>,
    max_size_bytes: u64,
    scratch_dir: PathBuf,
}

impl UploadPipeline {
    pub fn new(
        inspector: Arc<dyn MediaInspector>,
        rewriter: Arc<dyn FastStartRewriter>,
        storage: Arc<dyn Storage>,
        max_size_bytes: u64,
    ) -> Self {
        Self {
            inspector,
            rewriter,
            storage,
            max_size_bytes,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Override the scratch directory (defaults to the system temp dir).
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Process one upload end to end and return the object key it was stored
    /// under. The caller commits the key to the database; a failure after
    /// storage put leaves an orphaned object, which is logged at the call
    /// site.
    #[tracing::instrument(skip(self, body), fields(media_type = %media_type, declared_len))]
    pub async fn run<S>(
        &self,
        body: S,
        declared_len: Option<u64>,
        media_type: &str,
    ) -> Result<String, PipelineError>
    where
        S: Stream<Item = Result<Bytes, PipelineError>> + Unpin + Send,
    {
        let mut job = UploadJob::new();
        let result = self.execute(&mut job, body, declared_len, media_type).await;
        job.cleanup().await;

        match &result {
            Ok(key) => {
                tracing::info!(key = %key, stage = ?job.stage, "upload pipeline completed");
            }
            Err(e) => {
                tracing::warn!(stage = ?job.stage, error = %e, "upload pipeline failed");
            }
        }
        result
    }

    async fn execute<S>(
        &self,
        job: &mut UploadJob,
        body: S,
        declared_len: Option<u64>,
        media_type: &str,
    ) -> Result<String, PipelineError>
    where
        S: Stream<Item = Result<Bytes, PipelineError>> + Unpin + Send,
    {
        // Reject on the declared length before touching the filesystem.
        if let Some(len) = declared_len {
            if len > self.max_size_bytes {
                return Err(PipelineError::PayloadTooLarge {
                    size: len,
                    max: self.max_size_bytes,
                });
            }
        }

        let buffered = self
            .scratch_dir
            .join(format!("reelvault-upload-{}.mp4", Uuid::new_v4()));
        job.track(buffered.clone());
        self.buffer_body(&buffered, body).await?;
        job.advance(UploadStage::BufferedLocally);

        let geometry = self.inspector.probe(&buffered).await?;
        let orientation = Orientation::classify(geometry.width, geometry.height);
        job.advance(UploadStage::Inspected);

        let rewritten = self.rewriter.output_path(&buffered);
        job.track(rewritten.clone());
        self.rewriter.remux(&buffered, &rewritten).await?;
        job.advance(UploadStage::Rewritten);

        let key = video_object_key(media_type, orientation)?;
        self.storage.put_file(&key, &rewritten, media_type).await?;
        job.advance(UploadStage::Uploaded);

        job.advance(UploadStage::Committed);
        Ok(key)
    }

    /// Stream the body to a scratch file, enforcing the size cap on the
    /// running byte count. The declared length is advisory; the count is
    /// authoritative.
    async fn buffer_body<S>(&self, path: &Path, mut body: S) -> Result<(), PipelineError>
    where
        S: Stream<Item = Result<Bytes, PipelineError>> + Unpin + Send,
    {
        let mut file = File::create(path).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_size_bytes {
                return Err(PipelineError::PayloadTooLarge {
                    size: written,
                    max: self.max_size_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::StreamGeometry;
    use async_trait::async_trait;
    use reelvault_core::storage_types::StorageBackend;
    use reelvault_storage::{LocalStorage, StorageError, StorageResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    struct MockInspector {
        geometry: Result<StreamGeometry, ()>,
        calls: AtomicUsize,
    }

    impl MockInspector {
        fn returning(width: u32, height: u32) -> Self {
            Self {
                geometry: Ok(StreamGeometry { width, height }),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                geometry: Err(()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaInspector for MockInspector {
        async fn probe(&self, _path: &Path) -> Result<StreamGeometry, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.geometry
                .map_err(|_| PipelineError::ProbeFailed("mock probe failure".to_string()))
        }
    }

    struct MockRewriter {
        fail: bool,
    }

    #[async_trait]
    impl FastStartRewriter for MockRewriter {
        fn output_path(&self, input: &Path) -> PathBuf {
            let mut name = input.as_os_str().to_os_string();
            name.push(".processing");
            PathBuf::from(name)
        }

        async fn remux(&self, input: &Path, output: &Path) -> Result<(), PipelineError> {
            if self.fail {
                // Leave a partial output behind, like a real failed remux.
                tokio::fs::write(output, b"partial").await?;
                return Err(PipelineError::RemuxFailed("mock remux failure".to_string()));
            }
            tokio::fs::copy(input, output).await?;
            Ok(())
        }
    }

    struct FailingStorage;

    #[async_trait]
    impl Storage for FailingStorage {
        async fn put(&self, _: &str, _: Vec<u8>, _: &str) -> StorageResult<()> {
            Err(StorageError::UploadFailed("mock upload failure".to_string()))
        }

        async fn put_file(&self, _: &str, _: &Path, _: &str) -> StorageResult<()> {
            Err(StorageError::UploadFailed("mock upload failure".to_string()))
        }

        async fn delete(&self, _: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn exists(&self, _: &str) -> StorageResult<bool> {
            Ok(false)
        }

        async fn get_presigned_url(&self, _: &str, _: Duration) -> StorageResult<String> {
            Err(StorageError::BackendError("unsupported".to_string()))
        }

        fn bucket(&self) -> &str {
            "failing"
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::Local
        }
    }

    fn body_of(chunks: Vec<&'static [u8]>) -> impl Stream<Item = Result<Bytes, PipelineError>> + Unpin + Send
    {
        futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c)))
                .collect::<Vec<_>>(),
        )
    }

    fn scratch_is_empty(dir: &TempDir) -> bool {
        std::fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    async fn local_storage(dir: &TempDir) -> Arc<dyn Storage> {
        Arc::new(
            LocalStorage::new(
                dir.path().to_path_buf(),
                "http://localhost:9000".to_string(),
            )
            .await
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_run_success_produces_partitioned_key() {
        let scratch = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let storage = local_storage(&store_dir).await;

        let pipeline = UploadPipeline::new(
            Arc::new(MockInspector::returning(1920, 1080)),
            Arc::new(MockRewriter { fail: false }),
            storage.clone(),
            1024,
        )
        .with_scratch_dir(scratch.path().to_path_buf());

        let key = pipeline
            .run(body_of(vec![b"fake mp4 bytes"]), Some(14), "video/mp4")
            .await
            .unwrap();

        assert!(key.starts_with("landscape/"));
        assert!(key.ends_with(".mp4"));
        assert!(storage.exists(&key).await.unwrap());
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_run_portrait_geometry_maps_to_portrait_prefix() {
        let scratch = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();

        let pipeline = UploadPipeline::new(
            Arc::new(MockInspector::returning(1080, 1920)),
            Arc::new(MockRewriter { fail: false }),
            local_storage(&store_dir).await,
            1024,
        )
        .with_scratch_dir(scratch.path().to_path_buf());

        let key = pipeline
            .run(body_of(vec![b"bytes"]), None, "video/mp4")
            .await
            .unwrap();

        assert!(key.starts_with("portrait/"));
    }

    #[tokio::test]
    async fn test_declared_length_over_cap_rejected_before_buffering() {
        let scratch = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let inspector = Arc::new(MockInspector::returning(1920, 1080));

        let pipeline = UploadPipeline::new(
            inspector.clone(),
            Arc::new(MockRewriter { fail: false }),
            local_storage(&store_dir).await,
            100,
        )
        .with_scratch_dir(scratch.path().to_path_buf());

        let err = pipeline
            .run(body_of(vec![b"tiny"]), Some(101), "video/mp4")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::PayloadTooLarge { size: 101, max: 100 }
        ));
        assert_eq!(inspector.call_count(), 0);
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_streamed_body_over_cap_rejected_before_probe() {
        let scratch = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let inspector = Arc::new(MockInspector::returning(1920, 1080));

        let pipeline = UploadPipeline::new(
            inspector.clone(),
            Arc::new(MockRewriter { fail: false }),
            local_storage(&store_dir).await,
            10,
        )
        .with_scratch_dir(scratch.path().to_path_buf());

        // Declared length lies; the running count catches it.
        let err = pipeline
            .run(
                body_of(vec![b"eight by", b"more than ten"]),
                Some(5),
                "video/mp4",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::PayloadTooLarge { .. }));
        assert_eq!(inspector.call_count(), 0);
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_probe_failure_cleans_scratch() {
        let scratch = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();

        let pipeline = UploadPipeline::new(
            Arc::new(MockInspector::failing()),
            Arc::new(MockRewriter { fail: false }),
            local_storage(&store_dir).await,
            1024,
        )
        .with_scratch_dir(scratch.path().to_path_buf());

        let err = pipeline
            .run(body_of(vec![b"bytes"]), None, "video/mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ProbeFailed(_)));
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_remux_failure_cleans_partial_output() {
        let scratch = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();

        let pipeline = UploadPipeline::new(
            Arc::new(MockInspector::returning(1920, 1080)),
            Arc::new(MockRewriter { fail: true }),
            local_storage(&store_dir).await,
            1024,
        )
        .with_scratch_dir(scratch.path().to_path_buf());

        let err = pipeline
            .run(body_of(vec![b"bytes"]), None, "video/mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::RemuxFailed(_)));
        // Both the buffered input and the partial remux output are gone.
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_upload_failure_cleans_scratch() {
        let scratch = TempDir::new().unwrap();

        let pipeline = UploadPipeline::new(
            Arc::new(MockInspector::returning(1920, 1080)),
            Arc::new(MockRewriter { fail: false }),
            Arc::new(FailingStorage),
            1024,
        )
        .with_scratch_dir(scratch.path().to_path_buf());

        let err = pipeline
            .run(body_of(vec![b"bytes"]), None, "video/mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::UploadFailed(_)));
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_unsupported_media_type_rejected_after_rewrite() {
        let scratch = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let storage = local_storage(&store_dir).await;

        let pipeline = UploadPipeline::new(
            Arc::new(MockInspector::returning(1920, 1080)),
            Arc::new(MockRewriter { fail: false }),
            storage,
            1024,
        )
        .with_scratch_dir(scratch.path().to_path_buf());

        let err = pipeline
            .run(body_of(vec![b"bytes"]), None, "video/webm")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::UnsupportedMediaType(_)));
        assert!(scratch_is_empty(&scratch));
    }
}
