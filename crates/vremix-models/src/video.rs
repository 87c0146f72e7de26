//! Video metadata models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frame rate used when a probe does not report a usable one.
pub const FALLBACK_FRAME_RATE: FrameRate = FrameRate { num: 30, den: 1 };

/// Rational frame rate as reported by ffprobe (e.g. `30000/1001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    pub fn new(num: u32, den: u32) -> Option<Self> {
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Keyframe interval for one keyframe per second (never below 1).
    pub fn gop_size(&self) -> u32 {
        (self.as_f64().floor() as u32).max(1)
    }

    /// Minimum keyframe interval, half the frame rate (never below 1).
    pub fn min_keyint(&self) -> u32 {
        ((self.as_f64() / 2.0).floor() as u32).max(1)
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        FALLBACK_FRAME_RATE
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Error returned when a frame rate expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frame rate expression: {0}")]
pub struct FrameRateParseError(pub String);

impl FromStr for FrameRate {
    type Err = FrameRateParseError;

    /// Parse `num/den` or a decimal such as `29.97`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || FrameRateParseError(s.to_string());

        if let Some((num, den)) = s.split_once('/') {
            let num: u32 = num.trim().parse().map_err(|_| err())?;
            let den: u32 = den.trim().parse().map_err(|_| err())?;
            return FrameRate::new(num, den).ok_or_else(err);
        }

        let fps: f64 = s.parse().map_err(|_| err())?;
        if !fps.is_finite() || fps <= 0.0 {
            return Err(err());
        }
        if fps.fract() == 0.0 {
            return FrameRate::new(fps as u32, 1).ok_or_else(err);
        }
        // Keep three decimals of precision for values like 29.97
        FrameRate::new((fps * 1000.0).round() as u32, 1000).ok_or_else(err)
    }
}

/// Metadata probed from a video file.
///
/// Computed fresh on every probe call and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoDescriptor {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate of the first video stream
    #[serde(rename = "fps")]
    pub frame_rate: f64,
    /// Duration in seconds
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    /// Container format label (e.g. "mov,mp4,m4a,3gp,3g2,mj2")
    #[serde(rename = "format")]
    pub container_format: String,
    /// File size in bytes
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rational() {
        let rate: FrameRate = "30000/1001".parse().unwrap();
        assert_eq!(rate, FrameRate { num: 30000, den: 1001 });
        assert!((rate.as_f64() - 29.97).abs() < 0.01);
        assert_eq!(rate.gop_size(), 29);
        assert_eq!(rate.min_keyint(), 14);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!("25".parse::<FrameRate>().unwrap(), FrameRate { num: 25, den: 1 });
        let rate: FrameRate = "29.97".parse().unwrap();
        assert!((rate.as_f64() - 29.97).abs() < 0.001);
    }

    #[test]
    fn test_parse_rejects_zero_and_garbage() {
        assert!("0/0".parse::<FrameRate>().is_err());
        assert!("30/0".parse::<FrameRate>().is_err());
        assert!("abc".parse::<FrameRate>().is_err());
        assert!("-5".parse::<FrameRate>().is_err());
    }

    #[test]
    fn test_keyframe_intervals_never_zero() {
        let slow = FrameRate::new(1, 2).unwrap();
        assert_eq!(slow.gop_size(), 1);
        assert_eq!(slow.min_keyint(), 1);
    }

    #[test]
    fn test_descriptor_json_field_names() {
        let descriptor = VideoDescriptor {
            width: 1920,
            height: 1080,
            frame_rate: 30.0,
            duration_seconds: 5.0,
            container_format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            size_bytes: 1024,
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["width"], 1920);
        assert_eq!(json["duration"], 5.0);
        assert_eq!(json["format"], "mov,mp4,m4a,3gp,3g2,mj2");
        assert_eq!(json["size"], 1024);
    }
}
