//! Encoding options for an MP3 conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ConverterError;

/// Bitrate mode of the MP3 encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// Quality target (VBR), 0 is best and 9 is smallest.
    #[default]
    Variable,
    /// Fixed data rate (CBR) in kbps.
    Constant,
}

impl EncodingMode {
    /// Whether `preset` is acceptable for this mode.
    pub fn accepts(&self, preset: u32) -> bool {
        match self {
            Self::Variable => preset <= 9,
            Self::Constant => (8..=320).contains(&preset) && preset % 8 == 0,
        }
    }

    /// Human readable form of the accepted preset range.
    pub fn preset_rule(&self) -> &'static str {
        match self {
            Self::Variable => "VBR preset must be within 0 and 9",
            Self::Constant => "CBR preset must be within 8kbps and 320kbps (also a multiple of 8)",
        }
    }

    /// Preset used when none is configured.
    pub fn default_preset(&self) -> u32 {
        match self {
            Self::Variable => 2,
            Self::Constant => 128,
        }
    }
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable => write!(f, "variable"),
            Self::Constant => write!(f, "constant"),
        }
    }
}

/// Options applied to a single conversion.
///
/// The preset is validated against whichever mode is active when it is
/// assigned. Switching the mode afterwards does not re-check the stored
/// preset, so callers changing both should set the mode first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    mode: EncodingMode,
    preset: u32,
    min_bitrate_kbps: u32,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            mode: EncodingMode::Variable,
            preset: 2,
            min_bitrate_kbps: 0,
        }
    }
}

impl ConversionOptions {
    /// Variable bitrate options with the given quality target.
    pub fn variable(quality: u32) -> Result<Self, ConverterError> {
        let mut options = Self::default();
        options.set_preset(quality)?;
        Ok(options)
    }

    /// Constant bitrate options with the given rate in kbps.
    pub fn constant(kbps: u32) -> Result<Self, ConverterError> {
        let mut options = Self {
            mode: EncodingMode::Constant,
            ..Default::default()
        };
        options.set_preset(kbps)?;
        Ok(options)
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    pub fn preset(&self) -> u32 {
        self.preset
    }

    /// Minimum bitrate in kbps at or above which an MP3 input is copied
    /// instead of re-encoded. Zero disables the skip.
    pub fn min_bitrate_kbps(&self) -> u32 {
        self.min_bitrate_kbps
    }

    pub fn set_mode(&mut self, mode: EncodingMode) {
        self.mode = mode;
    }

    /// Assigns the preset, rejecting values the active mode does not accept.
    pub fn set_preset(&mut self, preset: u32) -> Result<(), ConverterError> {
        if !self.mode.accepts(preset) {
            return Err(ConverterError::InvalidPreset {
                mode: self.mode,
                value: preset,
            });
        }
        self.preset = preset;
        Ok(())
    }

    pub fn set_min_bitrate_kbps(&mut self, kbps: u32) {
        self.min_bitrate_kbps = kbps;
    }

    /// Sets the skip threshold, consuming self.
    pub fn with_min_bitrate_kbps(mut self, kbps: u32) -> Self {
        self.min_bitrate_kbps = kbps;
        self
    }

    /// Whether the bitrate skip is enabled.
    pub fn skip_enabled(&self) -> bool {
        self.min_bitrate_kbps > 0
    }

    /// ffmpeg quality flag and value for the active mode.
    pub fn quality_args(&self) -> [String; 2] {
        let flag = match self.mode {
            EncodingMode::Variable => "-q:a",
            EncodingMode::Constant => "-b",
        };
        [flag.to_string(), self.preset.to_string()]
    }
}
