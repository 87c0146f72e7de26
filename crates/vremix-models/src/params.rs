//! Processing parameters and derived crop geometry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default rotation in degrees
pub const DEFAULT_ROTATION_ANGLE: f64 = 2.0;
/// Default frame-drop interval (drop one frame out of every N)
pub const DEFAULT_FRAME_INTERVAL: i64 = 10;
/// Default zoom factor applied before cropping back to the source size
pub const DEFAULT_SCALE_FACTOR: f64 = 1.03;

/// Errors raised by parameter checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("scale factor must be greater than 1.0, got {0}")]
    ScaleFactorTooSmall(f64),

    #[error("rotation angle must be a finite number, got {0}")]
    NonFiniteRotation(f64),

    #[error("invalid source dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Caller-supplied parameters for one processing run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingParameters {
    /// Rotation in degrees; negative values and values beyond 360 pass through as-is
    #[serde(default = "default_rotation_angle")]
    pub rotation_angle: f64,

    /// Drop one frame out of every `frame_interval`; zero or negative disables frame drop
    #[serde(default = "default_frame_interval")]
    pub frame_interval: i64,

    /// Zoom factor, must exceed 1.0
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
}

fn default_rotation_angle() -> f64 {
    DEFAULT_ROTATION_ANGLE
}
fn default_frame_interval() -> i64 {
    DEFAULT_FRAME_INTERVAL
}
fn default_scale_factor() -> f64 {
    DEFAULT_SCALE_FACTOR
}

impl Default for ProcessingParameters {
    fn default() -> Self {
        Self {
            rotation_angle: DEFAULT_ROTATION_ANGLE,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            scale_factor: DEFAULT_SCALE_FACTOR,
        }
    }
}

impl ProcessingParameters {
    pub fn new(rotation_angle: f64, frame_interval: i64, scale_factor: f64) -> Self {
        Self {
            rotation_angle,
            frame_interval,
            scale_factor,
        }
    }

    /// Rotation converted to radians. No normalization is applied.
    pub fn rotation_radians(&self) -> f64 {
        self.rotation_angle * std::f64::consts::PI / 180.0
    }

    /// Frame-drop interval if the stage is enabled.
    pub fn drop_interval(&self) -> Option<u64> {
        (self.frame_interval > 0).then_some(self.frame_interval as u64)
    }

    /// Reject parameters that would produce an empty or negative crop region.
    pub fn check(&self) -> Result<(), ParameterError> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 1.0 {
            return Err(ParameterError::ScaleFactorTooSmall(self.scale_factor));
        }
        if !self.rotation_angle.is_finite() {
            return Err(ParameterError::NonFiniteRotation(self.rotation_angle));
        }
        Ok(())
    }
}

/// Zoom-then-crop geometry that recenters a scaled frame at the source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CropGeometry {
    /// Source width, also the crop width
    pub width: u32,
    /// Source height, also the crop height
    pub height: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

impl CropGeometry {
    /// Derive geometry from source dimensions and a zoom factor.
    ///
    /// Scaled sizes are floored, offsets are half the growth (floored).
    pub fn compute(width: u32, height: u32, scale_factor: f64) -> Result<Self, ParameterError> {
        if width == 0 || height == 0 {
            return Err(ParameterError::InvalidDimensions { width, height });
        }
        if !scale_factor.is_finite() || scale_factor <= 1.0 {
            return Err(ParameterError::ScaleFactorTooSmall(scale_factor));
        }

        let scaled_width = (width as f64 * scale_factor).floor() as u32;
        let scaled_height = (height as f64 * scale_factor).floor() as u32;

        // Float rounding can land one pixel short for factors barely above 1.0
        let scaled_width = scaled_width.max(width);
        let scaled_height = scaled_height.max(height);

        Ok(Self {
            width,
            height,
            scaled_width,
            scaled_height,
            crop_x: (scaled_width - width) / 2,
            crop_y: (scaled_height - height) / 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ProcessingParameters::default();
        assert_eq!(params.rotation_angle, 2.0);
        assert_eq!(params.frame_interval, 10);
        assert_eq!(params.scale_factor, 1.03);
        assert!(params.check().is_ok());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let params: ProcessingParameters =
            serde_json::from_str(r#"{"rotation_angle": -5.0}"#).unwrap();
        assert_eq!(params.rotation_angle, -5.0);
        assert_eq!(params.frame_interval, 10);
        assert_eq!(params.scale_factor, 1.03);
    }

    #[test]
    fn test_rotation_radians_not_normalized() {
        let params = ProcessingParameters::new(720.0, 10, 1.03);
        assert!((params.rotation_radians() - 4.0 * std::f64::consts::PI).abs() < 1e-9);

        let params = ProcessingParameters::new(-90.0, 10, 1.03);
        assert!((params.rotation_radians() + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_drop_interval() {
        assert_eq!(ProcessingParameters::new(2.0, 10, 1.03).drop_interval(), Some(10));
        assert_eq!(ProcessingParameters::new(2.0, 0, 1.03).drop_interval(), None);
        assert_eq!(ProcessingParameters::new(2.0, -3, 1.03).drop_interval(), None);
    }

    #[test]
    fn test_check_rejects_small_scale() {
        for scale in [1.0, 0.5, 0.0, -1.0, f64::NAN] {
            let params = ProcessingParameters::new(2.0, 10, scale);
            assert!(matches!(
                params.check(),
                Err(ParameterError::ScaleFactorTooSmall(_))
            ));
        }
    }

    #[test]
    fn test_crop_geometry_1080p() {
        let geometry = CropGeometry::compute(1920, 1080, 1.03).unwrap();
        assert_eq!(geometry.scaled_width, 1977);
        assert_eq!(geometry.scaled_height, 1112);
        assert_eq!(geometry.crop_x, 28);
        assert_eq!(geometry.crop_y, 16);
    }

    #[test]
    fn test_crop_geometry_invariants() {
        let sizes = [(1, 1), (2, 3), (640, 360), (1280, 720), (1921, 1081), (3840, 2160)];
        let scales = [1.0001, 1.01, 1.03, 1.5, 2.0, 3.7];

        for &(width, height) in &sizes {
            for &scale in &scales {
                let g = CropGeometry::compute(width, height, scale).unwrap();
                assert!(g.scaled_width >= width);
                assert!(g.scaled_height >= height);
                assert!(g.crop_x <= g.scaled_width - width);
                assert!(g.crop_y <= g.scaled_height - height);
            }
        }
    }

    #[test]
    fn test_crop_geometry_rejects_zero_dimensions() {
        assert!(matches!(
            CropGeometry::compute(0, 1080, 1.03),
            Err(ParameterError::InvalidDimensions { .. })
        ));
    }
}
