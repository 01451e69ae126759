//! Reelvault Processing Library
//!
//! The upload processing pipeline: media inspection (ffprobe), fast-start
//! container rewriting (ffmpeg), and the orchestrator that sequences
//! buffering, inspection, rewriting, and upload with explicit temp-file
//! cleanup.

pub mod error;
pub mod faststart;
pub mod pipeline;
pub mod probe;

// Re-export commonly used types
pub use error::PipelineError;
pub use faststart::{FastStartRewriter, FfmpegRewriter};
pub use pipeline::{UploadPipeline, UploadStage};
pub use probe::{FfprobeInspector, MediaInspector, StreamGeometry};
