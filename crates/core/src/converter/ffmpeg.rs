//! FFmpeg-based conversion runner.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::options::ConversionOptions;
use super::output::OutputLines;
use super::progress::{format_duration, sample_from_line};
use super::traits::Converter;
use super::types::{ConversionTask, ProgressSample, RunResult, RunState, TARGET_CODEC};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Trailing flags: frame-rate resync, overwrite, fatal-only logging and
/// periodic stats on stderr.
const TRAILING_ARGS: [&str; 6] = ["-vsync", "2", "-y", "-loglevel", "fatal", "-stats"];

/// Where progress samples of a run are delivered.
enum ProgressSink<'a> {
    None,
    Channel(mpsc::Sender<ProgressSample>),
    Callback(Box<dyn FnMut(ProgressSample) + Send + 'a>),
}

/// State owned by a single run.
struct RunContext<'a> {
    task: &'a ConversionTask,
    diagnostics: String,
    sink: ProgressSink<'a>,
    samples: usize,
}

impl<'a> RunContext<'a> {
    fn new(task: &'a ConversionTask, sink: ProgressSink<'a>) -> Self {
        Self {
            task,
            diagnostics: String::new(),
            sink,
            samples: 0,
        }
    }

    fn append(&mut self, line: &str) {
        self.diagnostics.push_str(line);
        self.diagnostics.push('\n');
    }

    /// Records one output line and reports progress if it carries a
    /// timestamp.
    async fn handle_line(&mut self, line: &str) {
        self.append(line);

        let Some(sample) = sample_from_line(line, self.task.duration()) else {
            return;
        };
        self.samples += 1;

        match &mut self.sink {
            ProgressSink::None => {}
            ProgressSink::Channel(tx) => {
                // Receiver gone means nobody is listening; keep converting
                let _ = tx.send(sample).await;
            }
            ProgressSink::Callback(callback) => callback(sample),
        }
    }

    fn finish(self, state: RunState, exit_code: Option<i32>) -> RunResult {
        RunResult {
            state,
            diagnostics: self.diagnostics,
            exit_code,
        }
    }
}

/// Runs a bundled ffmpeg binary to produce MP3 files.
///
/// The runner holds no per-run state, so one instance can serve
/// overlapping conversions.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    ffmpeg_path: PathBuf,
}

impl FfmpegRunner {
    /// Creates a runner for an already located ffmpeg binary.
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Locates ffmpeg as configured and creates a runner for it.
    pub fn from_config(config: &ConverterConfig) -> Result<Self, ConverterError> {
        Ok(Self::new(config.locate_tool()?))
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Builds ffmpeg arguments for an MP3 conversion.
    pub fn build_args(task: &ConversionTask, options: &ConversionOptions) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            task.input_path().to_string_lossy().to_string(),
            "-codec:a".to_string(),
            TARGET_CODEC.to_string(),
        ];
        args.extend(options.quality_args());
        args.push(task.output_path().to_string_lossy().to_string());
        args.extend(TRAILING_ARGS.iter().map(|a| a.to_string()));
        args
    }

    /// Renders the arguments as a single command line, paths quoted.
    pub fn command_line(task: &ConversionTask, options: &ConversionOptions) -> String {
        let [flag, value] = options.quality_args();
        format!(
            "-i \"{}\" -codec:a {} {} {} \"{}\" {}",
            task.input_path().display(),
            TARGET_CODEC,
            flag,
            value,
            task.output_path().display(),
            TRAILING_ARGS.join(" ")
        )
    }

    /// Converts, delivering progress to a callback on the calling task.
    pub async fn convert_with_callback<'a, F>(
        &self,
        task: &'a ConversionTask,
        options: &ConversionOptions,
        on_progress: F,
    ) -> Result<RunResult, ConverterError>
    where
        F: FnMut(ProgressSample) + Send + 'a,
    {
        self.run(task, options, ProgressSink::Callback(Box::new(on_progress)))
            .await
    }

    async fn run<'a>(
        &self,
        task: &'a ConversionTask,
        options: &ConversionOptions,
        sink: ProgressSink<'a>,
    ) -> Result<RunResult, ConverterError> {
        if task.should_skip(options) {
            info!(
                "Input {:?} already at {:?} kbps (minimum {}), copying to {:?}",
                task.input_path(),
                task.media().audio_bitrate_kbps,
                options.min_bitrate_kbps(),
                task.output_path()
            );
            if is_same_file(task.input_path(), task.output_path()).await {
                return Err(ConverterError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!(
                        "cannot copy {} onto itself",
                        task.input_path().display()
                    ),
                )));
            }
            tokio::fs::copy(task.input_path(), task.output_path()).await?;
            return Ok(RunResult::skipped());
        }

        let start = Instant::now();
        let mut ctx = RunContext::new(task, sink);
        let command_line = Self::command_line(task, options);
        ctx.diagnostics = format!("Args:{}\n", command_line);
        debug!("Running {:?} {}", self.ffmpeg_path, command_line);

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(Self::build_args(task, options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(target_os = "windows")]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to start {:?}: {}", self.ffmpeg_path, e);
                ctx.append(&format!("Failed to start {}: {}", self.ffmpeg_path.display(), e));
                return Ok(ctx.finish(RunState::StartFailed, None));
            }
        };

        info!(
            "Converting {:?} -> {:?} ({})",
            task.input_path(),
            task.output_path(),
            format_duration(task.duration())
        );

        // Nothing is written to stdin; the pipe stays open until exit
        let _stdin = child.stdin.take();
        let mut stdout = child.stdout.take().map(OutputLines::new);
        let mut stderr = child.stderr.take().map(OutputLines::new);
        let mut stdout_open = stdout.is_some();
        let mut stderr_open = stderr.is_some();

        while stdout_open || stderr_open {
            tokio::select! {
                line = next_line(&mut stdout), if stdout_open => match line {
                    Some(line) => ctx.handle_line(&line).await,
                    None => stdout_open = false,
                },
                line = next_line(&mut stderr), if stderr_open => match line {
                    Some(line) => ctx.handle_line(&line).await,
                    None => stderr_open = false,
                },
            }
        }

        let exit_code = match child.wait().await {
            Ok(status) => {
                if !status.success() {
                    warn!("ffmpeg exited with {} for {:?}", status, task.input_path());
                }
                status.code()
            }
            Err(e) => {
                warn!("Failed to wait for ffmpeg: {}", e);
                None
            }
        };

        info!(
            "Finished {:?} in {} ms ({} progress updates)",
            task.output_path(),
            start.elapsed().as_millis(),
            ctx.samples
        );

        Ok(ctx.finish(RunState::Completed, exit_code))
    }
}

/// Whether both paths name the same file, resolving links when both exist.
async fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

async fn next_line<R: AsyncRead + Unpin>(lines: &mut Option<OutputLines<R>>) -> Option<String> {
    match lines {
        Some(lines) => match lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                debug!("Output stream closed with error: {}", e);
                None
            }
        },
        None => None,
    }
}

#[async_trait]
impl Converter for FfmpegRunner {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn convert(
        &self,
        task: &ConversionTask,
        options: &ConversionOptions,
    ) -> Result<RunResult, ConverterError> {
        self.run(task, options, ProgressSink::None).await
    }

    async fn convert_with_progress(
        &self,
        task: &ConversionTask,
        options: &ConversionOptions,
        progress_tx: mpsc::Sender<ProgressSample>,
    ) -> Result<RunResult, ConverterError> {
        self.run(task, options, ProgressSink::Channel(progress_tx))
            .await
    }
}
