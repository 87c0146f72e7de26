//! Application state.

use std::sync::Arc;

use vremix_media::{check_ffmpeg, check_ffprobe, FfmpegEngine, MediaEngine, MediaResult, ValidatorConfig};

use crate::config::ApiConfig;
use crate::store::FileStore;

/// Shared application state.
///
/// Nothing in here is mutable; each request works on its own files.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub engine: Arc<dyn MediaEngine>,
    pub store: FileStore,
    pub validator: ValidatorConfig,
}

impl AppState {
    /// Create state backed by the FFmpeg command-line tools.
    pub async fn new(config: ApiConfig) -> MediaResult<Self> {
        let ffmpeg = match &config.ffmpeg_path {
            Some(path) => path.clone(),
            None => check_ffmpeg()?,
        };
        let ffprobe = match &config.ffprobe_path {
            Some(path) => path.clone(),
            None => check_ffprobe()?,
        };

        let engine = FfmpegEngine::new(ffmpeg, ffprobe);
        Self::with_engine(config, Arc::new(engine)).await
    }

    /// Create state around any engine implementation.
    pub async fn with_engine(config: ApiConfig, engine: Arc<dyn MediaEngine>) -> MediaResult<Self> {
        let store = FileStore::new(&config.upload_dir, &config.output_dir);
        store.ensure_dirs().await?;

        let validator = ValidatorConfig::default().with_max_file_size(config.max_upload_size);

        Ok(Self {
            config,
            engine,
            store,
            validator,
        })
    }
}
