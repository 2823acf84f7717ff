//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::ConverterError;
use super::options::ConversionOptions;
use super::probe::MetadataReader;

/// File extension of the conversion target.
pub const TARGET_EXTENSION: &str = "mp3";

/// ffmpeg audio encoder for the conversion target.
pub const TARGET_CODEC: &str = "libmp3lame";

/// Media file information relevant to a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// File path.
    pub path: PathBuf,
    /// Total playback length.
    pub duration: Duration,
    /// Audio bitrate in kbps, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bitrate_kbps: Option<u32>,
}

/// An input/output pairing with a metadata snapshot of the input.
///
/// The snapshot is taken once, before any process starts, and never
/// refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionTask {
    input_path: PathBuf,
    output_path: PathBuf,
    media: MediaInfo,
}

impl ConversionTask {
    /// Builds a task from an already read snapshot.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        media: MediaInfo,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            media,
        }
    }

    /// Reads the input's metadata and builds a task from it.
    ///
    /// Errors from the reader are returned unchanged.
    pub async fn prepare<R>(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        reader: &R,
    ) -> Result<Self, ConverterError>
    where
        R: MetadataReader + ?Sized,
    {
        let input_path = input_path.into();
        let media = reader.read(&input_path).await?;
        Ok(Self::new(input_path, output_path, media))
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn media(&self) -> &MediaInfo {
        &self.media
    }

    /// Total duration of the input.
    pub fn duration(&self) -> Duration {
        self.media.duration
    }

    /// Whether the input already has the target extension (case-insensitive).
    pub fn is_target_format(&self) -> bool {
        self.input_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(TARGET_EXTENSION))
            .unwrap_or(false)
    }

    /// Whether the input can be copied verbatim instead of re-encoded.
    ///
    /// Requires the target extension, an enabled threshold, and a known
    /// input bitrate at or above that threshold.
    pub fn should_skip(&self, options: &ConversionOptions) -> bool {
        self.is_target_format()
            && options.skip_enabled()
            && self
                .media
                .audio_bitrate_kbps
                .map(|kbps| kbps >= options.min_bitrate_kbps())
                .unwrap_or(false)
    }
}

/// One progress observation parsed from the tool's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    /// Elapsed over total, in whole seconds. May exceed 1.0.
    pub progress: f64,
    /// Elapsed position reported by the tool.
    pub elapsed: Duration,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Input copied to the output without invoking the tool.
    Skipped,
    /// The tool ran to exit. Its exit code is not interpreted.
    Completed,
    /// The tool could not be started.
    StartFailed,
}

/// Outcome of a single conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// How the run ended.
    pub state: RunState,
    /// Command line followed by every output line, in arrival order.
    pub diagnostics: String,
    /// Exit code of the tool, when it ran and exited normally.
    pub exit_code: Option<i32>,
}

impl RunResult {
    /// Result for a run that took the copy path.
    pub fn skipped() -> Self {
        Self {
            state: RunState::Skipped,
            diagnostics: String::new(),
            exit_code: None,
        }
    }

    /// Whether the run counts as successful.
    pub fn success(&self) -> bool {
        !matches!(self.state, RunState::StartFailed)
    }

    /// Whether the tool was invoked.
    pub fn invoked_tool(&self) -> bool {
        matches!(self.state, RunState::Completed)
    }
}
