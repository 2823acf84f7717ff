//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

use super::options::EncodingMode;

/// Errors that can occur while locating the tool, reading metadata or
/// configuring a conversion.
///
/// A child process that fails to start is not represented here; it is
/// reported through [`RunResult`](super::RunResult) instead.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// FFmpeg binary not found at the computed or configured location.
    #[error("ffmpeg cannot be found in the specified path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The directory of the running executable could not be determined.
    #[error("Unable to determine install directory: {reason}")]
    InstallDirUnavailable { reason: String },

    /// Preset value outside the range accepted by the active mode.
    #[error("Invalid preset {value} for {mode} mode: {}", .mode.preset_rule())]
    InvalidPreset { mode: EncodingMode, value: u32 },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    ProbeToolNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Failed to read media metadata.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }

    /// Whether this error is a fatal configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound { .. }
                | Self::InstallDirUnavailable { .. }
                | Self::ProbeToolNotFound { .. }
        )
    }
}
