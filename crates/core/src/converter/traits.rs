//! Trait definitions for the converter module.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::ConverterError;
use super::options::ConversionOptions;
use super::types::{ConversionTask, ProgressSample, RunResult};

/// Performs one MP3 conversion per call.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts the task's input, returning once the conversion has ended.
    async fn convert(
        &self,
        task: &ConversionTask,
        options: &ConversionOptions,
    ) -> Result<RunResult, ConverterError>;

    /// Converts with progress reporting.
    ///
    /// One sample is sent per parsed output line. If the receiver is
    /// dropped, conversion continues without progress reporting.
    async fn convert_with_progress(
        &self,
        task: &ConversionTask,
        options: &ConversionOptions,
        progress_tx: mpsc::Sender<ProgressSample>,
    ) -> Result<RunResult, ConverterError>;
}
