//! Converter module for producing MP3 files with a bundled ffmpeg.
//!
//! This module locates the ffmpeg binary shipped with the application, runs
//! it as a child process and turns its `-stats` output into progress
//! samples.
//!
//! # Features
//!
//! - Per-architecture binary lookup under `external/{x86,x64}/`
//! - Variable (`-q:a`) and constant (`-b`) bitrate modes with validated presets
//! - Copy instead of re-encode for MP3 inputs already at a minimum bitrate
//! - Progress reporting through a channel or a callback
//!
//! # Example
//!
//! ```ignore
//! use ffconvert_core::converter::{
//!     ConversionOptions, ConversionTask, Converter, FfmpegRunner, FfprobeReader, Locator,
//! };
//!
//! let runner = FfmpegRunner::new(Locator::locate()?);
//! let reader = FfprobeReader::default();
//!
//! let task = ConversionTask::prepare("/music/a.wav", "/music/a.mp3", &reader).await?;
//! let options = ConversionOptions::variable(2)?;
//!
//! let result = runner
//!     .convert_with_callback(&task, &options, |sample| {
//!         println!("{:.0}%", sample.progress * 100.0);
//!     })
//!     .await?;
//! assert!(result.success());
//! ```

mod config;
mod error;
mod ffmpeg;
mod locator;
mod options;
mod output;
mod probe;
mod progress;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegRunner;
pub use locator::{arch_dir, install_dir, Locator, EXTERNAL_DIR, FFMPEG_BINARY};
pub use options::{ConversionOptions, EncodingMode};
pub use output::OutputLines;
pub use probe::{FfprobeReader, MetadataReader};
pub use progress::{
    format_duration, parse_progress_time, progress_ratio, sample_from_line, TIME_FIELD_WIDTH,
    TIME_MARKER,
};
pub use traits::Converter;
pub use types::{
    ConversionTask, MediaInfo, ProgressSample, RunResult, RunState, TARGET_CODEC,
    TARGET_EXTENSION,
};
