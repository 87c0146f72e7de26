//! Shared data models for the vremix video service.
//!
//! This crate provides Serde-serializable types for:
//! - Probed video metadata and frame rates
//! - Caller-supplied processing parameters and derived crop geometry
//! - Output encoding configuration

pub mod encoding;
pub mod params;
pub mod video;

// Re-export common types
pub use encoding::EncodingConfig;
pub use params::{CropGeometry, ParameterError, ProcessingParameters};
pub use video::{FrameRate, VideoDescriptor};
