use super::{types::Config, ConfigError};
use crate::converter::ConversionOptions;

/// Validate configuration and derive the encoding options from it.
/// Currently validates:
/// - Preset is within the range of the configured mode
/// - Progress buffer is not 0
pub fn validate_config(config: &Config) -> Result<ConversionOptions, ConfigError> {
    if config.converter.progress_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "converter.progress_buffer cannot be 0".to_string(),
        ));
    }

    config
        .encoding
        .to_options()
        .map_err(|e| ConfigError::ValidationError(format!("encoding: {}", e)))
}
