//! Flat on-disk stores for uploads and processed outputs.
//!
//! Names are random UUIDs, so concurrent requests never collide and no
//! locking is needed. There is no index and no expiry.

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use uuid::Uuid;
use vremix_models::encoding::OUTPUT_EXTENSION;

use crate::error::{ApiError, ApiResult};

/// Prefix of every processed output filename.
pub const OUTPUT_PREFIX: &str = "processed_";

/// Upload and output directories.
#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

/// Paths allocated for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub output_filename: String,
}

impl FileStore {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Create both directories if missing.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.output_dir).await
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Allocate a fresh input path keeping the client's extension, and the
    /// matching `processed_<id>.mp4` output path.
    pub fn allocate(&self, client_filename: Option<&str>) -> UploadSlot {
        let id = Uuid::new_v4();
        let ext = client_filename
            .and_then(|name| Path::new(name).extension())
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let output_filename = format!("{}{}.{}", OUTPUT_PREFIX, id, OUTPUT_EXTENSION);

        UploadSlot {
            input_path: self.upload_dir.join(format!("{}{}", id, ext)),
            output_path: self.output_dir.join(&output_filename),
            output_filename,
        }
    }

    /// Resolve a client-supplied name inside the output directory.
    pub fn output_path(&self, filename: &str) -> ApiResult<PathBuf> {
        check_filename(filename)?;
        Ok(self.output_dir.join(filename))
    }
}

/// Accept only a single plain path component; separators of either style
/// and NUL are rejected outright.
fn check_filename(filename: &str) -> ApiResult<()> {
    let mut components = Path::new(filename).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !plain || filename.contains(['/', '\\', '\0']) {
        return Err(ApiError::bad_request("Invalid filename"));
    }
    Ok(())
}
