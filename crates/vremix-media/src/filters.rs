//! FFmpeg video filter definitions.
//!
//! The transform chain is an ordered list of [`VideoOperation`]s rendered into a
//! single `-vf` filtergraph. Order is significant and preserved exactly.

use std::fmt;

use vremix_models::{CropGeometry, ProcessingParameters};

/// Fill color for corners exposed by rotation.
pub const ROTATE_FILL_COLOR: &str = "black";

/// Timestamp rewrite that keeps playback at the original rate after frames are dropped.
pub const SETPTS_CONSTANT_RATE: &str = "N/FRAME_RATE/TB";

/// A single step of the transform chain.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoOperation {
    /// Mirror left-right.
    HorizontalFlip,
    /// Scale to exact dimensions.
    Scale { width: u32, height: u32 },
    /// Crop a `width`x`height` region at (`x`, `y`).
    Crop { width: u32, height: u32, x: u32, y: u32 },
    /// Rotate by `radians`, filling exposed corners.
    Rotate { radians: f64, fill_color: String },
    /// Keep only frames whose decoded index is not a multiple of `interval`.
    DropEveryNth { interval: u64 },
    /// Rewrite presentation timestamps.
    SetPts { expr: String },
}

impl VideoOperation {
    /// FFmpeg filter name.
    pub fn name(&self) -> &'static str {
        match self {
            VideoOperation::HorizontalFlip => "hflip",
            VideoOperation::Scale { .. } => "scale",
            VideoOperation::Crop { .. } => "crop",
            VideoOperation::Rotate { .. } => "rotate",
            VideoOperation::DropEveryNth { .. } => "select",
            VideoOperation::SetPts { .. } => "setpts",
        }
    }

    /// Render as a filtergraph entry.
    pub fn to_filter(&self) -> String {
        match self {
            VideoOperation::HorizontalFlip => "hflip".to_string(),
            VideoOperation::Scale { width, height } => format!("scale=w={}:h={}", width, height),
            VideoOperation::Crop { width, height, x, y } => {
                format!("crop=w={}:h={}:x={}:y={}", width, height, x, y)
            }
            VideoOperation::Rotate { radians, fill_color } => {
                format!("rotate=angle={}:fillcolor={}", radians, fill_color)
            }
            // Comma is escaped so the graph parser keeps the expression intact
            VideoOperation::DropEveryNth { interval } => format!("select=expr=mod(n\\,{})", interval),
            VideoOperation::SetPts { expr } => format!("setpts={}", expr),
        }
    }
}

impl fmt::Display for VideoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_filter())
    }
}

/// Ordered chain of video operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    operations: Vec<VideoOperation>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation.
    pub fn then(mut self, op: VideoOperation) -> Self {
        self.operations.push(op);
        self
    }

    /// Build the flip / zoom / recenter / rotate / frame-drop chain.
    pub fn transform(geometry: &CropGeometry, params: &ProcessingParameters) -> Self {
        let chain = Self::new()
            .then(VideoOperation::HorizontalFlip)
            .then(VideoOperation::Scale {
                width: geometry.scaled_width,
                height: geometry.scaled_height,
            })
            .then(VideoOperation::Crop {
                width: geometry.width,
                height: geometry.height,
                x: geometry.crop_x,
                y: geometry.crop_y,
            })
            .then(VideoOperation::Rotate {
                radians: params.rotation_radians(),
                fill_color: ROTATE_FILL_COLOR.to_string(),
            });

        match params.drop_interval() {
            Some(interval) => chain
                .then(VideoOperation::DropEveryNth { interval })
                .then(VideoOperation::SetPts {
                    expr: SETPTS_CONSTANT_RATE.to_string(),
                }),
            None => chain,
        }
    }

    pub fn operations(&self) -> &[VideoOperation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Interval of the frame-drop stage, if present.
    pub fn drop_interval(&self) -> Option<u64> {
        self.operations.iter().find_map(|op| match op {
            VideoOperation::DropEveryNth { interval } => Some(*interval),
            _ => None,
        })
    }

    /// Render as a comma-separated `-vf` filtergraph.
    pub fn to_filtergraph(&self) -> String {
        self.operations
            .iter()
            .map(VideoOperation::to_filter)
            .collect::<Vec<_>>()
            .join(",")
    }
}
