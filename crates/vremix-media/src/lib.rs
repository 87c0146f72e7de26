#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for the vremix transform pipeline.
//!
//! This crate provides:
//! - Input validation (existence, size ceiling, extension allow-list)
//! - FFprobe metadata queries
//! - Type-safe filter chain and FFmpeg command building
//! - The flip / zoom-crop / rotate / frame-drop pipeline builder
//! - A `MediaEngine` seam so tests can run without FFmpeg

pub mod command;
pub mod engine;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod validate;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use engine::{FfmpegEngine, MediaEngine, TranscodeJob};
pub use error::{MediaError, MediaResult};
pub use filters::{FilterChain, VideoOperation};
pub use fs_utils::{discard, remove_if_exists};
pub use pipeline::{build_job, describe, process};
pub use probe::{FfprobeRunner, ProbeFormat, ProbeOutput, ProbeStream};
pub use progress::FfmpegProgress;
pub use validate::{validate, ValidatorConfig, MAX_FILE_SIZE, SUPPORTED_EXTENSIONS};
