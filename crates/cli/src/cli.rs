//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use ffconvert_core::{EncodingConfig, EncodingMode};

#[derive(Debug, Parser)]
#[command(
    name = "ffconvert",
    version,
    about = "Convert an audio file to MP3 with the bundled ffmpeg"
)]
pub struct Cli {
    /// File to convert
    pub input: PathBuf,

    /// Destination file, defaults to the input with an .mp3 extension
    pub output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, env = "FFCONVERT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bitrate mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// 0-9 for variable mode, 8-320 kbps in steps of 8 for constant mode
    #[arg(long)]
    pub preset: Option<u32>,

    /// Copy MP3 inputs at or above this bitrate (kbps) instead of re-encoding
    #[arg(long)]
    pub min_bitrate: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Variable,
    Constant,
}

impl From<ModeArg> for EncodingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Variable => EncodingMode::Variable,
            ModeArg::Constant => EncodingMode::Constant,
        }
    }
}

impl Cli {
    /// Applies command line values over the configured ones.
    ///
    /// Switching mode without a preset falls back to that mode's default.
    pub fn apply_overrides(&self, encoding: &mut EncodingConfig) {
        if let Some(mode) = self.mode.map(EncodingMode::from) {
            if mode != encoding.mode {
                encoding.preset = None;
            }
            encoding.mode = mode;
        }
        if let Some(preset) = self.preset {
            encoding.preset = Some(preset);
        }
        if let Some(kbps) = self.min_bitrate {
            encoding.min_bitrate_kbps = kbps;
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("mp3"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["ffconvert", "a.wav"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("a.wav"));
        assert_eq!(cli.output_path(), PathBuf::from("a.mp3"));
        assert!(cli.mode.is_none());
    }

    #[test]
    fn test_mode_switch_resets_preset() {
        let cli = Cli::try_parse_from(["ffconvert", "a.wav", "--mode", "constant"]).unwrap();
        let mut encoding = EncodingConfig {
            mode: EncodingMode::Variable,
            preset: Some(4),
            min_bitrate_kbps: 0,
        };
        cli.apply_overrides(&mut encoding);
        assert_eq!(encoding.mode, EncodingMode::Constant);
        assert_eq!(encoding.preset, None);
        assert_eq!(encoding.to_options().unwrap().preset(), 128);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "ffconvert",
            "a.flac",
            "b.mp3",
            "--mode",
            "constant",
            "--preset",
            "192",
            "--min-bitrate",
            "160",
        ])
        .unwrap();
        let mut encoding = EncodingConfig::default();
        cli.apply_overrides(&mut encoding);

        let options = encoding.to_options().unwrap();
        assert_eq!(options.mode(), EncodingMode::Constant);
        assert_eq!(options.preset(), 192);
        assert_eq!(options.min_bitrate_kbps(), 160);
        assert_eq!(cli.output_path(), PathBuf::from("b.mp3"));
    }

    #[test]
    fn test_overrides_apply_over_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[encoding]
mode = "constant"
preset = 256
min_bitrate_kbps = 192
"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "ffconvert",
            "a.wav",
            "--config",
            path.as_str(),
            "--preset",
            "320",
        ])
        .unwrap();
        let mut config = ffconvert_core::load_config(cli.config.as_deref().unwrap()).unwrap();
        cli.apply_overrides(&mut config.encoding);

        let options = ffconvert_core::validate_config(&config).unwrap();
        assert_eq!(options.mode(), EncodingMode::Constant);
        assert_eq!(options.preset(), 320);
        assert_eq!(options.min_bitrate_kbps(), 192);
    }

    #[test]
    fn test_invalid_preset_reaches_validation() {
        let cli = Cli::try_parse_from(["ffconvert", "a.wav", "--preset", "12"]).unwrap();
        let mut encoding = EncodingConfig::default();
        cli.apply_overrides(&mut encoding);
        assert!(encoding.to_options().is_err());
    }
}
