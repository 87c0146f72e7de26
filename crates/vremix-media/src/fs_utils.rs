//! Filesystem helpers for transient and output artifacts.

use std::path::Path;
use tokio::fs;

use crate::error::MediaResult;

/// Remove a file if it exists.
///
/// Returns `true` when a file was deleted and `false` when there was nothing
/// to delete. Other IO failures are returned as errors.
pub async fn remove_if_exists(path: impl AsRef<Path>) -> MediaResult<bool> {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Best-effort removal used on failure paths; errors are logged, not returned.
pub async fn discard(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match remove_if_exists(path).await {
        Ok(true) => tracing::info!("Removed partial file: {}", path.display()),
        Ok(false) => {}
        Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_remove_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.mp4");
        fs::write(&path, b"partial").await.unwrap();

        assert!(remove_if_exists(&path).await.unwrap());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(!remove_if_exists(dir.path().join("ghost.mp4")).await.unwrap());
    }

    #[tokio::test]
    async fn test_discard_is_silent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.mp4");
        fs::write(&path, b"x").await.unwrap();

        discard(&path).await;
        discard(&path).await;
        assert!(!path.exists());
    }
}
