use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment variables overriding file values,
/// e.g. `FFCONVERT_ENCODING__PRESET=4`
pub const ENV_PREFIX: &str = "FFCONVERT_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::EncodingMode;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[converter]
install_dir = "/opt/ffconvert"

[encoding]
mode = "constant"
preset = 192
min_bitrate_kbps = 128
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.converter.install_dir, Some(PathBuf::from("/opt/ffconvert")));
        assert_eq!(config.encoding.mode, EncodingMode::Constant);
        assert_eq!(config.encoding.preset, Some(192));
        assert_eq!(config.encoding.min_bitrate_kbps, 128);
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.encoding.mode, EncodingMode::Variable);
        assert_eq!(config.encoding.preset, None);
        assert_eq!(config.converter.ffprobe_path, PathBuf::from("ffprobe"));
    }

    #[test]
    fn test_load_config_from_str_bad_mode() {
        let toml = r#"
[encoding]
mode = "average"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/ffconvert.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[converter]
ffprobe_path = "/usr/bin/ffprobe"
progress_buffer = 8

[encoding]
preset = 4
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.converter.ffprobe_path, PathBuf::from("/usr/bin/ffprobe"));
        assert_eq!(config.converter.progress_buffer, 8);
        assert_eq!(config.encoding.preset, Some(4));
    }
}
