//! Output encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::FrameRate;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "medium";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 23;
/// Output container is always MP4
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Video encoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Output frame rate; also drives GOP size and minimum keyframe interval
    #[serde(default)]
    pub frame_rate: FrameRate,

    /// Drop all audio streams
    #[serde(default = "default_true")]
    pub strip_audio: bool,

    /// Move the moov atom to the start of the file for progressive download
    #[serde(default = "default_true")]
    pub faststart: bool,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_true() -> bool {
    true
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            frame_rate: FrameRate::default(),
            strip_audio: true,
            faststart: true,
        }
    }
}

impl EncodingConfig {
    /// Create configuration pinned to the source frame rate.
    pub fn for_source(frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            ..Default::default()
        }
    }

    /// Convert to FFmpeg command arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-r".to_string(),
            self.frame_rate.to_string(),
            "-g".to_string(),
            self.frame_rate.gop_size().to_string(),
            "-keyint_min".to_string(),
            self.frame_rate.min_keyint().to_string(),
        ];

        if self.strip_audio {
            args.push("-an".to_string());
        }

        if self.faststart {
            args.extend_from_slice(&["-movflags".to_string(), "+faststart".to_string()]);
        }

        // Constant frame rate pacing
        args.extend_from_slice(&["-vsync".to_string(), "cfr".to_string()]);

        args
    }
}
