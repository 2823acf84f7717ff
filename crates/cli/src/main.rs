mod cli;
mod convert;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ffconvert_core::{
    load_config, validate_config, Config, ConfigError, ConversionTask, FfmpegRunner,
    FfprobeReader,
};

use cli::Cli;
use convert::run_conversion;

/// Config file used when neither `--config` nor `FFCONVERT_CONFIG` is set
const DEFAULT_CONFIG: &str = "ffconvert.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => match load_config(&PathBuf::from(DEFAULT_CONFIG)) {
            Ok(config) => config,
            Err(ConfigError::FileNotFound(_)) => Config::default(),
            Err(e) => return Err(e).context("Failed to load default config"),
        },
    };
    cli.apply_overrides(&mut config.encoding);

    let options = validate_config(&config).context("Configuration validation failed")?;
    info!(
        "Encoding {} mode, preset {}, skip at {} kbps",
        options.mode(),
        options.preset(),
        options.min_bitrate_kbps()
    );

    let runner = FfmpegRunner::from_config(&config.converter).context("ffmpeg is not available")?;
    let reader = FfprobeReader::new(config.converter.ffprobe_path.clone());

    let output = cli.output_path();
    if output == cli.input {
        bail!("Output path {:?} is the input file", output);
    }

    let task = ConversionTask::prepare(&cli.input, &output, &reader)
        .await
        .with_context(|| format!("Failed to read {:?}", cli.input))?;

    let report = run_conversion(&runner, &task, &options, config.converter.progress_buffer).await?;

    if !report.result.success() {
        bail!("ffmpeg could not be started:\n{}", report.result.diagnostics);
    }
    if let Some(code) = report.result.exit_code.filter(|c| *c != 0) {
        warn!("ffmpeg exited with code {}", code);
    }
    info!("Wrote {:?}", output);

    Ok(())
}
