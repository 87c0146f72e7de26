//! Transform pipeline builder.
//!
//! One call probes the source, derives crop geometry, assembles the
//! flip / zoom / recenter / rotate / frame-drop chain, pins the output
//! encoding to the source frame rate, and runs a single transcode.

use std::path::Path;

use metrics::counter;
use tracing::{error, info};

use vremix_models::{CropGeometry, EncodingConfig, ProcessingParameters, VideoDescriptor};

use crate::engine::{MediaEngine, TranscodeJob};
use crate::error::{MediaError, MediaResult};
use crate::filters::FilterChain;
use crate::fs_utils::discard;
use crate::probe::ProbeOutput;

pub const VIDEOS_PROCESSED_TOTAL: &str = "vremix_videos_processed_total";
pub const VIDEOS_FAILED_TOTAL: &str = "vremix_videos_failed_total";

/// Assemble the transcode job for a probed source. Pure; no engine calls.
pub fn build_job(
    input: &Path,
    output: &Path,
    probe: &ProbeOutput,
    params: &ProcessingParameters,
) -> MediaResult<TranscodeJob> {
    params.check()?;

    let stream = probe.first_video_stream()?;
    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        (w, h) => {
            return Err(MediaError::InvalidVideo(format!(
                "video stream has no usable dimensions ({}x{})",
                w.unwrap_or(0),
                h.unwrap_or(0)
            )))
        }
    };

    let geometry = CropGeometry::compute(width, height, params.scale_factor)?;

    Ok(TranscodeJob {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        chain: FilterChain::transform(&geometry, params),
        encoding: EncodingConfig::for_source(stream.frame_rate()),
    })
}

/// Transform `input` into `output`.
///
/// On any failure the output file is removed before the error is returned,
/// so a partial artifact is never left behind.
pub async fn process(
    engine: &dyn MediaEngine,
    input: &Path,
    output: &Path,
    params: &ProcessingParameters,
) -> MediaResult<()> {
    match run_pipeline(engine, input, output, params).await {
        Ok(()) => {
            counter!(VIDEOS_PROCESSED_TOTAL).increment(1);
            info!(output = %output.display(), "Video processing complete");
            Ok(())
        }
        Err(e) => {
            counter!(VIDEOS_FAILED_TOTAL).increment(1);
            error!(input = %input.display(), error = %e, "Video processing failed");
            discard(output).await;
            Err(e)
        }
    }
}

async fn run_pipeline(
    engine: &dyn MediaEngine,
    input: &Path,
    output: &Path,
    params: &ProcessingParameters,
) -> MediaResult<()> {
    // Fail before touching the engine
    params.check()?;

    let probe = engine.probe(input).await?;
    let job = build_job(input, output, &probe, params)?;

    info!(
        input = %input.display(),
        rotation_angle = params.rotation_angle,
        frame_interval = params.frame_interval,
        scale_factor = params.scale_factor,
        frame_rate = %job.encoding.frame_rate,
        "Starting video processing"
    );

    engine.run(&job).await
}

/// Probe a file and summarize its first video stream.
pub async fn describe(engine: &dyn MediaEngine, path: &Path) -> MediaResult<VideoDescriptor> {
    let probe = engine.probe(path).await.map_err(|e| match e {
        MediaError::FileNotFound(p) => {
            MediaError::probe_failed(format!("cannot probe {}: file not found", p.display()), None)
        }
        other => other,
    })?;

    probe.to_descriptor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockMediaEngine;
    use crate::filters::VideoOperation;
    use crate::probe::parse_probe_json;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use vremix_models::FrameRate;

    fn sample_probe(width: u32, height: u32, rate: &str) -> ProbeOutput {
        let json = format!(
            r#"{{"streams": [
                {{"codec_type": "audio"}},
                {{"codec_type": "video", "width": {}, "height": {}, "r_frame_rate": "{}"}}
            ], "format": {{"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "5.0", "size": "2048"}}}}"#,
            width, height, rate
        );
        parse_probe_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_build_job_1080p() {
        let probe = sample_probe(1920, 1080, "30/1");
        let job = build_job(
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            &probe,
            &ProcessingParameters::default(),
        )
        .unwrap();

        let ops = job.chain.operations();
        assert_eq!(ops[0], VideoOperation::HorizontalFlip);
        assert_eq!(ops[1], VideoOperation::Scale { width: 1977, height: 1112 });
        assert_eq!(
            ops[2],
            VideoOperation::Crop { width: 1920, height: 1080, x: 28, y: 16 }
        );
        assert_eq!(job.chain.drop_interval(), Some(10));
        assert_eq!(job.encoding.frame_rate, FrameRate::new(30, 1).unwrap());
        assert_eq!(job.encoding.crf, 23);
        assert!(job.encoding.strip_audio);
    }

    #[test]
    fn test_build_job_is_deterministic() {
        let probe = sample_probe(1280, 720, "30000/1001");
        let params = ProcessingParameters::new(-3.5, 4, 1.1);
        let a = build_job(Path::new("in.mkv"), Path::new("a.mp4"), &probe, &params).unwrap();
        let b = build_job(Path::new("in.mkv"), Path::new("b.mp4"), &probe, &params).unwrap();
        assert_eq!(a.chain, b.chain);
        assert_eq!(a.encoding, b.encoding);
    }

    #[test]
    fn test_build_job_rejects_zero_dimensions() {
        let probe = sample_probe(0, 1080, "30/1");
        let err = build_job(
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            &probe,
            &ProcessingParameters::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::InvalidVideo(_)));
    }

    #[tokio::test]
    async fn test_process_runs_engine_once() {
        let mut engine = MockMediaEngine::new();
        engine
            .expect_probe()
            .times(1)
            .returning(|_| Ok(sample_probe(1920, 1080, "30/1")));
        engine
            .expect_run()
            .withf(|job| {
                job.chain.drop_interval().is_none()
                    && job.chain.operations().len() == 4
                    && job.output == PathBuf::from("out.mp4")
            })
            .times(1)
            .returning(|_| Ok(()));

        let params = ProcessingParameters::new(2.0, 0, 1.03);
        process(&engine, Path::new("in.mp4"), Path::new("out.mp4"), &params)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_engine_failure_removes_partial_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("processed.mp4");

        let mut engine = MockMediaEngine::new();
        engine
            .expect_probe()
            .returning(|_| Ok(sample_probe(640, 360, "25/1")));
        engine.expect_run().times(1).returning(|job| {
            std::fs::write(&job.output, b"truncated mdat").unwrap();
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some("Conversion failed!".to_string()),
                Some(1),
            ))
        });

        let err = process(
            &engine,
            Path::new("in.mp4"),
            &output,
            &ProcessingParameters::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MediaError::FfmpegFailed { .. }));
        assert!(!output.exists(), "partial output must be removed");
    }

    #[tokio::test]
    async fn test_small_scale_factor_rejected_before_probe() {
        // No expectations: any engine call would panic
        let engine = MockMediaEngine::new();
        let params = ProcessingParameters::new(2.0, 10, 1.0);

        let err = process(&engine, Path::new("in.mp4"), Path::new("out.mp4"), &params)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidParameters(_)));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_missing_video_stream_skips_transcode() {
        let mut engine = MockMediaEngine::new();
        engine.expect_probe().returning(|_| {
            Ok(parse_probe_json(br#"{"streams": [{"codec_type": "audio"}], "format": {}}"#).unwrap())
        });
        engine.expect_run().never();

        let err = process(
            &engine,
            Path::new("song.mp4"),
            Path::new("out.mp4"),
            &ProcessingParameters::default(),
        )
        .await
        .unwrap_err();
        assert!(err.is_probe());
    }

    #[tokio::test]
    async fn test_describe_maps_missing_file_to_probe_error() {
        let mut engine = MockMediaEngine::new();
        engine
            .expect_probe()
            .returning(|path| Err(MediaError::FileNotFound(path.to_path_buf())));

        let err = describe(&engine, Path::new("ghost.mp4")).await.unwrap_err();
        assert!(matches!(err, MediaError::ProbeFailed { .. }));
    }

    #[tokio::test]
    async fn test_describe_returns_descriptor() {
        let mut engine = MockMediaEngine::new();
        engine
            .expect_probe()
            .returning(|_| Ok(sample_probe(1920, 1080, "30/1")));

        let descriptor = describe(&engine, Path::new("out.mp4")).await.unwrap();
        assert_eq!(descriptor.width, 1920);
        assert_eq!(descriptor.height, 1080);
        assert_eq!(descriptor.duration_seconds, 5.0);
        assert_eq!(descriptor.size_bytes, 2048);
    }
}
