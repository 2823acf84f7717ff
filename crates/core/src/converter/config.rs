//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::ConverterError;
use super::locator::Locator;

/// Configuration for the FFmpeg-based runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Directory holding `external/<arch>/ffmpeg`. Defaults to the
    /// directory of the running executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// Explicit ffmpeg binary, bypassing the install directory layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Path to ffprobe binary, used to read input metadata.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Capacity of the progress channel.
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_progress_buffer() -> usize {
    64
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            install_dir: None,
            ffmpeg_path: None,
            ffprobe_path: default_ffprobe_path(),
            progress_buffer: default_progress_buffer(),
        }
    }
}

impl ConverterConfig {
    /// Sets the install directory.
    pub fn with_install_dir(mut self, install_dir: PathBuf) -> Self {
        self.install_dir = Some(install_dir);
        self
    }

    /// Sets an explicit ffmpeg binary.
    pub fn with_ffmpeg_path(mut self, ffmpeg_path: PathBuf) -> Self {
        self.ffmpeg_path = Some(ffmpeg_path);
        self
    }

    /// Sets the ffprobe binary.
    pub fn with_ffprobe_path(mut self, ffprobe_path: PathBuf) -> Self {
        self.ffprobe_path = ffprobe_path;
        self
    }

    /// Resolves the ffmpeg binary this configuration points at.
    pub fn locate_tool(&self) -> Result<PathBuf, ConverterError> {
        match (&self.ffmpeg_path, &self.install_dir) {
            (Some(path), _) => Locator::with_binary(path),
            (None, Some(dir)) => Locator::locate_in(dir),
            (None, None) => Locator::locate(),
        }
    }
}
