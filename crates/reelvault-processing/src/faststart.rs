//! Fast-start container rewriting via ffmpeg.
//!
//! MP4 files written by most encoders put the moov atom at the end of the
//! file, which forces a full download before playback can begin. A stream
//! copy with `-movflags faststart` moves the atom to the front without
//! re-encoding.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::PipelineError;
use crate::probe::SUBPROCESS_TIMEOUT;

/// Rewrites a buffered upload into a streaming-friendly layout.
///
/// `output_path` is deterministic and exposed separately so the caller can
/// register the path for cleanup before the rewrite starts; a failed run may
/// still leave a partial file behind.
#[async_trait]
pub trait FastStartRewriter: Send + Sync {
    fn output_path(&self, input: &Path) -> PathBuf;

    async fn remux(&self, input: &Path, output: &Path) -> Result<(), PipelineError>;
}

/// Rewriter backed by an ffmpeg subprocess doing a stream copy.
pub struct FfmpegRewriter {
    ffmpeg_path: String,
}

impl FfmpegRewriter {
    pub fn new(ffmpeg_path: String) -> Self {
        Self { ffmpeg_path }
    }
}

#[async_trait]
impl FastStartRewriter for FfmpegRewriter {
    fn output_path(&self, input: &Path) -> PathBuf {
        let mut name = OsString::from(input.as_os_str());
        name.push(".processing");
        PathBuf::from(name)
    }

    #[tracing::instrument(skip(self, input, output), fields(ffmpeg_path = %self.ffmpeg_path))]
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), PipelineError> {
        let start = std::time::Instant::now();

        let child = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let result = tokio::time::timeout(SUBPROCESS_TIMEOUT, child)
            .await
            .map_err(|_| {
                PipelineError::RemuxFailed(format!(
                    "ffmpeg timed out after {}s",
                    SUBPROCESS_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| PipelineError::RemuxFailed(format!("failed to spawn ffmpeg: {}", e)))?;

        if !result.status.success() {
            // Full stderr stays in the logs; the error carries only a summary.
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!(
                status = ?result.status.code(),
                stderr = %stderr,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "ffmpeg remux failed"
            );
            return Err(PipelineError::RemuxFailed(format!(
                "ffmpeg exited with status {:?}",
                result.status.code()
            )));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fast-start rewrite completed"
        );

        Ok(())
    }
}
