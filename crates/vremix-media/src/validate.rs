//! Input file validation.
//!
//! Runs before any engine call. Only the extension is checked, not the
//! container contents; a mislabeled file passes here and fails at probe time.

use std::path::Path;

use crate::error::{MediaError, MediaResult};

/// Default size ceiling for uploaded files (500 MiB).
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Accepted input extensions, lowercase with the leading dot.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".mp4", ".mov", ".avi", ".mkv"];

/// Validation policy.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Maximum file size in bytes
    pub max_file_size: u64,
    /// Allowed extensions (lowercase, with leading dot)
    pub allowed_extensions: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            allowed_extensions: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ValidatorConfig {
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Check existence, size and extension, in that order.
    pub async fn validate(&self, path: impl AsRef<Path>) -> MediaResult<()> {
        let path = path.as_ref();

        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(MediaError::FileNotFound(path.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(MediaError::Io(e)),
        };

        let size = metadata.len();
        if size > self.max_file_size {
            return Err(MediaError::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        let ext = dotted_extension(path);
        if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            return Err(MediaError::UnsupportedFormat(if ext.is_empty() {
                "(none)".to_string()
            } else {
                ext
            }));
        }

        Ok(())
    }
}

/// Validate with the default policy.
pub async fn validate(path: impl AsRef<Path>) -> MediaResult<()> {
    ValidatorConfig::default().validate(path).await
}

/// Lowercased extension with its leading dot, or empty.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
