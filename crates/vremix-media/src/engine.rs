//! External media engine seam.
//!
//! The pipeline talks to FFmpeg/FFprobe only through [`MediaEngine`], so the
//! HTTP layer and tests can substitute a fake engine.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use tracing::debug;

use vremix_models::EncodingConfig;

use crate::command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::FilterChain;
use crate::probe::{FfprobeRunner, ProbeOutput};

/// Histogram of FFmpeg wall time per transcode.
pub const FFMPEG_DURATION_SECONDS: &str = "vremix_ffmpeg_duration_seconds";

/// Everything the engine needs for one transcode.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub chain: FilterChain,
    pub encoding: EncodingConfig,
}

impl TranscodeJob {
    /// Render as an FFmpeg command that overwrites the output.
    pub fn to_command(&self) -> FfmpegCommand {
        FfmpegCommand::new(&self.input, &self.output)
            .filter_chain(&self.chain)
            .output_args(self.encoding.to_ffmpeg_args())
            .overwrite(true)
    }
}

/// Probe and transcode operations backed by an external engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Raw stream and format metadata for a file.
    async fn probe(&self, path: &Path) -> MediaResult<ProbeOutput>;

    /// Run one transcode to completion.
    async fn run(&self, job: &TranscodeJob) -> MediaResult<()>;

    /// Whether the engine can currently be invoked.
    async fn check_available(&self) -> MediaResult<()> {
        Ok(())
    }
}

/// [`MediaEngine`] backed by the `ffmpeg` and `ffprobe` command-line tools.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: FfmpegRunner,
    ffprobe: FfprobeRunner,
}

impl FfmpegEngine {
    /// Use explicit binaries.
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: FfmpegRunner::new(ffmpeg),
            ffprobe: FfprobeRunner::new(ffprobe),
        }
    }

    /// Resolve both binaries from PATH.
    pub fn from_path() -> MediaResult<Self> {
        Ok(Self::new(check_ffmpeg()?, check_ffprobe()?))
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe(&self, path: &Path) -> MediaResult<ProbeOutput> {
        self.ffprobe.probe(path).await
    }

    async fn run(&self, job: &TranscodeJob) -> MediaResult<()> {
        let cmd = job.to_command();
        let start = Instant::now();

        let result = self.ffmpeg.run(&cmd).await;

        let elapsed = start.elapsed().as_secs_f64();
        histogram!(FFMPEG_DURATION_SECONDS).record(elapsed);
        debug!(elapsed_secs = elapsed, ok = result.is_ok(), "FFmpeg finished");

        result
    }

    async fn check_available(&self) -> MediaResult<()> {
        which::which(self.ffmpeg.binary()).map_err(|_| MediaError::FfmpegNotFound)?;
        which::which(self.ffprobe.binary()).map_err(|_| MediaError::FfprobeNotFound)?;
        Ok(())
    }
}
