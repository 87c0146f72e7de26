//! FFprobe video information.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use vremix_models::video::FALLBACK_FRAME_RATE;
use vremix_models::{FrameRate, VideoDescriptor};

use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub format: ProbeFormat,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeFormat {
    pub format_name: Option<String>,
    pub duration: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub r_frame_rate: Option<String>,
}

impl ProbeStream {
    pub fn is_video(&self) -> bool {
        self.codec_type.as_deref() == Some("video")
    }

    pub fn is_audio(&self) -> bool {
        self.codec_type.as_deref() == Some("audio")
    }

    /// Frame rate from `r_frame_rate`, falling back to 30/1 when absent or unparsable.
    pub fn frame_rate(&self) -> FrameRate {
        self.r_frame_rate
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or(FALLBACK_FRAME_RATE)
    }
}

impl ProbeOutput {
    /// First stream with `codec_type == "video"`.
    pub fn first_video_stream(&self) -> MediaResult<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.is_video())
            .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))
    }

    pub fn audio_stream_count(&self) -> usize {
        self.streams.iter().filter(|s| s.is_audio()).count()
    }

    /// Summarize the first video stream; missing fields default to zero/empty.
    pub fn to_descriptor(&self) -> MediaResult<VideoDescriptor> {
        let video_stream = self.first_video_stream()?;

        // Parse duration
        let duration_seconds = self
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        // Parse size
        let size_bytes = self
            .format
            .size
            .as_ref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        Ok(VideoDescriptor {
            width: video_stream.width.unwrap_or(0),
            height: video_stream.height.unwrap_or(0),
            frame_rate: video_stream.frame_rate().as_f64(),
            duration_seconds,
            container_format: self.format.format_name.clone().unwrap_or_default(),
            size_bytes,
        })
    }
}

/// Runs `ffprobe` and decodes its JSON report.
#[derive(Debug, Clone)]
pub struct FfprobeRunner {
    binary: PathBuf,
}

impl FfprobeRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Probe a file for format and stream metadata.
    pub async fn probe(&self, path: impl AsRef<Path>) -> MediaResult<ProbeOutput> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        debug!("Probing {}", path.display());

        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::FfprobeNotFound
                } else {
                    MediaError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(MediaError::probe_failed(
                format!("FFprobe could not read {}", path.display()),
                Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
            ));
        }

        parse_probe_json(&output.stdout)
    }
}

/// Decode ffprobe's `-print_format json` output.
pub fn parse_probe_json(bytes: &[u8]) -> MediaResult<ProbeOutput> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "audio", "codec_name": "aac"},
            {"index": 1, "codec_type": "video", "codec_name": "h264",
             "width": 1920, "height": 1080, "r_frame_rate": "30000/1001"},
            {"index": 2, "codec_type": "video", "codec_name": "mjpeg",
             "width": 320, "height": 240, "r_frame_rate": "90000/1"}
        ],
        "format": {
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "duration": "5.005000",
            "size": "1048576",
            "bit_rate": "1676000"
        }
    }"#;

    #[test]
    fn test_descriptor_uses_first_video_stream() {
        let probe = parse_probe_json(SAMPLE.as_bytes()).unwrap();
        let descriptor = probe.to_descriptor().unwrap();
        assert_eq!(descriptor.width, 1920);
        assert_eq!(descriptor.height, 1080);
        assert!((descriptor.frame_rate - 29.97).abs() < 0.01);
        assert!((descriptor.duration_seconds - 5.005).abs() < 1e-9);
        assert_eq!(descriptor.container_format, "mov,mp4,m4a,3gp,3g2,mj2");
        assert_eq!(descriptor.size_bytes, 1_048_576);
        assert_eq!(probe.audio_stream_count(), 1);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let probe = parse_probe_json(br#"{"streams": [{"codec_type": "video"}], "format": {}}"#).unwrap();
        let descriptor = probe.to_descriptor().unwrap();
        assert_eq!(descriptor.width, 0);
        assert_eq!(descriptor.height, 0);
        assert_eq!(descriptor.duration_seconds, 0.0);
        assert_eq!(descriptor.container_format, "");
        assert_eq!(descriptor.size_bytes, 0);
        assert_eq!(descriptor.frame_rate, 30.0);
    }

    #[test]
    fn test_no_video_stream() {
        let probe = parse_probe_json(br#"{"streams": [{"codec_type": "audio"}], "format": {}}"#).unwrap();
        let err = probe.to_descriptor().unwrap_err();
        assert!(matches!(err, MediaError::InvalidVideo(_)));
        assert!(err.is_probe());
    }

    #[test]
    fn test_unparsable_frame_rate_falls_back() {
        let stream = ProbeStream {
            codec_type: Some("video".to_string()),
            r_frame_rate: Some("0/0".to_string()),
            ..Default::default()
        };
        assert_eq!(stream.frame_rate(), FrameRate::new(30, 1).unwrap());
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_probe_json(b"not json").unwrap_err();
        assert!(matches!(err, MediaError::JsonParse(_)));
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let runner = FfprobeRunner::new("ffprobe");
        let err = runner.probe("/nonexistent/clip.mp4").await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
