pub mod config;
pub mod converter;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, EncodingConfig,
};
pub use converter::{
    ConversionOptions, ConversionTask, Converter, ConverterConfig, ConverterError, EncodingMode,
    FfmpegRunner, FfprobeReader, Locator, MetadataReader, ProgressSample, RunResult, RunState,
};
