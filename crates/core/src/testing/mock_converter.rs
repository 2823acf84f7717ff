//! Mock converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::converter::{
    ConversionOptions, ConversionTask, Converter, ConverterError, ProgressSample, RunResult,
    RunState,
};

/// A recorded conversion for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The task that was submitted.
    pub task: ConversionTask,
    /// The options it was submitted with.
    pub options: ConversionOptions,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversions for assertions
/// - Simulate a failed process start
/// - Emit a configured sequence of progress values
/// - Honor the copy path the same way the ffmpeg runner does
#[derive(Debug, Clone)]
pub struct MockConverter {
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    progress_steps: Arc<RwLock<Vec<f64>>>,
    fail_start: Arc<RwLock<bool>>,
    exit_code: Arc<RwLock<Option<i32>>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            progress_steps: Arc::new(RwLock::new(vec![0.25, 0.5, 0.75, 1.0])),
            fail_start: Arc::new(RwLock::new(false)),
            exit_code: Arc::new(RwLock::new(Some(0))),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions performed.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Set the progress values emitted by each conversion.
    pub async fn set_progress_steps(&self, steps: Vec<f64>) {
        *self.progress_steps.write().await = steps;
    }

    /// Make subsequent conversions report a failed process start.
    pub async fn set_fail_start(&self, fail: bool) {
        *self.fail_start.write().await = fail;
    }

    /// Set the exit code reported by completed conversions.
    pub async fn set_exit_code(&self, code: Option<i32>) {
        *self.exit_code.write().await = code;
    }

    async fn run(
        &self,
        task: &ConversionTask,
        options: &ConversionOptions,
        progress_tx: Option<mpsc::Sender<ProgressSample>>,
    ) -> Result<RunResult, ConverterError> {
        self.conversions.write().await.push(RecordedConversion {
            task: task.clone(),
            options: options.clone(),
        });

        if task.should_skip(options) {
            return Ok(RunResult::skipped());
        }

        let diagnostics = format!("Args:mock {}\n", task.input_path().display());
        if *self.fail_start.read().await {
            return Ok(RunResult {
                state: RunState::StartFailed,
                diagnostics,
                exit_code: None,
            });
        }

        if let Some(tx) = progress_tx {
            let total = task.duration().as_secs();
            for progress in self.progress_steps.read().await.iter().copied() {
                let sample = ProgressSample {
                    progress,
                    elapsed: Duration::from_secs((progress * total as f64) as u64),
                };
                let _ = tx.send(sample).await;
            }
        }

        Ok(RunResult {
            state: RunState::Completed,
            diagnostics,
            exit_code: *self.exit_code.read().await,
        })
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(
        &self,
        task: &ConversionTask,
        options: &ConversionOptions,
    ) -> Result<RunResult, ConverterError> {
        self.run(task, options, None).await
    }

    async fn convert_with_progress(
        &self,
        task: &ConversionTask,
        options: &ConversionOptions,
        progress_tx: mpsc::Sender<ProgressSample>,
    ) -> Result<RunResult, ConverterError> {
        self.run(task, options, Some(progress_tx)).await
    }
}
