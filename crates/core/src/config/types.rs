use serde::{Deserialize, Serialize};

use crate::converter::{ConversionOptions, ConverterConfig, ConverterError, EncodingMode};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
}

/// Encoding configuration, validated into [`ConversionOptions`]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EncodingConfig {
    #[serde(default)]
    pub mode: EncodingMode,
    /// Defaults per mode when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<u32>,
    /// 0 disables copying of inputs that are already MP3
    #[serde(default)]
    pub min_bitrate_kbps: u32,
}

impl EncodingConfig {
    pub fn to_options(&self) -> Result<ConversionOptions, ConverterError> {
        let mut options = ConversionOptions::default();
        options.set_mode(self.mode);
        options.set_preset(self.preset.unwrap_or_else(|| self.mode.default_preset()))?;
        options.set_min_bitrate_kbps(self.min_bitrate_kbps);
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoding_options() {
        let options = EncodingConfig::default().to_options().unwrap();
        assert_eq!(options, ConversionOptions::default());
    }

    #[test]
    fn test_constant_mode_default_preset() {
        let config = EncodingConfig {
            mode: EncodingMode::Constant,
            preset: None,
            min_bitrate_kbps: 0,
        };
        let options = config.to_options().unwrap();
        assert_eq!(options.preset(), 128);
    }

    #[test]
    fn test_preset_validated_against_mode() {
        let config = EncodingConfig {
            mode: EncodingMode::Constant,
            preset: Some(5),
            min_bitrate_kbps: 0,
        };
        assert!(matches!(
            config.to_options(),
            Err(ConverterError::InvalidPreset { value: 5, .. })
        ));
    }
}
