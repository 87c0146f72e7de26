//! End-to-end pipeline tests against the real FFmpeg binaries.
//!
//! Run with `cargo test -p vremix-media -- --ignored` on a machine with
//! `ffmpeg` and `ffprobe` in PATH.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio::process::Command;
use vremix_media::{describe, process, validate, FfmpegEngine, MediaEngine};
use vremix_models::ProcessingParameters;

/// Render a 1920x1080, 30fps, 5 second clip with a sine audio track.
async fn make_test_clip(dir: &Path) -> PathBuf {
    let path = dir.join("source.mp4");
    let status = Command::new("ffmpeg")
        .args([
            "-y", "-v", "error",
            "-f", "lavfi", "-i", "testsrc=size=1920x1080:rate=30:duration=5",
            "-f", "lavfi", "-i", "sine=frequency=440:duration=5",
            "-c:v", "libx264", "-preset", "ultrafast", "-pix_fmt", "yuv420p",
            "-c:a", "aac", "-shortest",
        ])
        .arg(&path)
        .status()
        .await
        .expect("ffmpeg should run");
    assert!(status.success(), "failed to render test clip");
    path
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_1080p_clip_keeps_geometry_and_drops_audio() {
    let dir = TempDir::new().unwrap();
    let input = make_test_clip(dir.path()).await;
    let output = dir.path().join("processed.mp4");
    let engine = FfmpegEngine::from_path().unwrap();

    validate(&input).await.unwrap();
    process(&engine, &input, &output, &ProcessingParameters::default())
        .await
        .unwrap();

    let info = describe(&engine, &output).await.unwrap();
    assert_eq!(info.width, 1920);
    assert_eq!(info.height, 1080);

    // 150 frames, every 10th dropped, retimed at 30fps
    let expected = 135.0 / 30.0;
    assert!(
        (info.duration_seconds - expected).abs() <= 1.0 / 30.0 + 1e-3,
        "duration {} not within one frame of {}",
        info.duration_seconds,
        expected
    );

    let probe = engine.probe(&output).await.unwrap();
    assert_eq!(probe.audio_stream_count(), 0);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_frame_drop_disabled_keeps_duration() {
    let dir = TempDir::new().unwrap();
    let input = make_test_clip(dir.path()).await;
    let output = dir.path().join("all_frames.mp4");
    let engine = FfmpegEngine::from_path().unwrap();

    process(&engine, &input, &output, &ProcessingParameters::new(2.0, 0, 1.03))
        .await
        .unwrap();

    let info = describe(&engine, &output).await.unwrap();
    assert!((info.duration_seconds - 5.0).abs() <= 1.0 / 30.0 + 1e-3);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_repeated_runs_match() {
    let dir = TempDir::new().unwrap();
    let input = make_test_clip(dir.path()).await;
    let engine = FfmpegEngine::from_path().unwrap();
    let params = ProcessingParameters::new(-7.5, 6, 1.2);

    let first = dir.path().join("first.mp4");
    let second = dir.path().join("second.mp4");
    process(&engine, &input, &first, &params).await.unwrap();
    process(&engine, &input, &second, &params).await.unwrap();

    let a = describe(&engine, &first).await.unwrap();
    let b = describe(&engine, &second).await.unwrap();
    assert_eq!((a.width, a.height), (b.width, b.height));
    assert!((a.duration_seconds - b.duration_seconds).abs() < 1e-6);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_mislabeled_file_fails_at_probe() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("fake.mp4");
    tokio::fs::write(&input, b"definitely not a video").await.unwrap();
    let output = dir.path().join("out.mp4");
    let engine = FfmpegEngine::from_path().unwrap();

    validate(&input).await.unwrap();
    let err = process(&engine, &input, &output, &ProcessingParameters::default())
        .await
        .unwrap_err();
    assert!(err.is_probe(), "unexpected error: {}", err);
    assert!(!output.exists());
}
