//! Media inspector - stream geometry extraction via ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::PipelineError;

/// Bound on a single subprocess run so a hung prober cannot hang the request.
pub(crate) const SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(120);

/// Width and height of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

/// Narrow probing interface so tests can substitute in-process fakes for the
/// external tool.
#[async_trait]
pub trait MediaInspector: Send + Sync {
    /// Extract the first video stream's geometry from a local file.
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, PipelineError>;
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse ffprobe's JSON output into a geometry.
fn parse_probe_output(stdout: &[u8]) -> Result<StreamGeometry, PipelineError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| PipelineError::ProbeFailed(format!("unparsable probe output: {}", e)))?;

    let stream = output.streams.first().ok_or(PipelineError::NoStreamFound)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Ok(StreamGeometry { width, height }),
        _ => Err(PipelineError::ProbeFailed(
            "stream is missing width or height".to_string(),
        )),
    }
}

/// Inspector backed by an ffprobe subprocess.
pub struct FfprobeInspector {
    ffprobe_path: String,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: String) -> Self {
        Self { ffprobe_path }
    }
}

#[async_trait]
impl MediaInspector for FfprobeInspector {
    #[tracing::instrument(skip(self, path), fields(ffprobe_path = %self.ffprobe_path))]
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, PipelineError> {
        let start = std::time::Instant::now();

        let child = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(SUBPROCESS_TIMEOUT, child)
            .await
            .map_err(|_| {
                PipelineError::ProbeFailed(format!(
                    "ffprobe timed out after {}s",
                    SUBPROCESS_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| PipelineError::ProbeFailed(format!("failed to spawn ffprobe: {}", e)))?;

        if !output.status.success() {
            // stderr goes to logs only; it must never reach the client.
            tracing::error!(
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "ffprobe failed"
            );
            return Err(PipelineError::ProbeFailed(format!(
                "ffprobe exited with status {:?}",
                output.status.code()
            )));
        }

        let geometry = parse_probe_output(&output.stdout)?;

        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video probe completed"
        );

        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{"streams":[{"width":1920,"height":1080,"codec_name":"h264"}]}"#;
        let geometry = parse_probe_output(json).unwrap();
        assert_eq!(
            geometry,
            StreamGeometry {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn test_parse_probe_output_takes_first_stream() {
        let json = br#"{"streams":[{"width":1080,"height":1920},{"width":640,"height":480}]}"#;
        let geometry = parse_probe_output(json).unwrap();
        assert_eq!(geometry.width, 1080);
        assert_eq!(geometry.height, 1920);
    }

    #[test]
    fn test_parse_probe_output_empty_streams() {
        let err = parse_probe_output(br#"{"streams":[]}"#).unwrap_err();
        assert!(matches!(err, PipelineError::NoStreamFound));

        // Missing "streams" key entirely is the same condition.
        let err = parse_probe_output(br#"{}"#).unwrap_err();
        assert!(matches!(err, PipelineError::NoStreamFound));
    }

    #[test]
    fn test_parse_probe_output_missing_geometry() {
        let err = parse_probe_output(br#"{"streams":[{"codec_name":"h264"}]}"#).unwrap_err();
        assert!(matches!(err, PipelineError::ProbeFailed(_)));
    }

    #[test]
    fn test_parse_probe_output_garbage() {
        let err = parse_probe_output(b"not json").unwrap_err();
        assert!(matches!(err, PipelineError::ProbeFailed(_)));
    }
}
