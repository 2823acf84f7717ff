//! Runs one conversion and logs its progress.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use ffconvert_core::{
    converter::format_duration, ConversionOptions, ConversionTask, Converter, ProgressSample,
    RunResult,
};

/// Outcome of a conversion together with the last progress seen.
#[derive(Debug)]
pub struct ConversionReport {
    pub result: RunResult,
    pub last_progress: Option<ProgressSample>,
}

pub async fn run_conversion<C>(
    converter: &C,
    task: &ConversionTask,
    options: &ConversionOptions,
    buffer: usize,
) -> Result<ConversionReport>
where
    C: Converter + ?Sized,
{
    let (tx, mut rx) = mpsc::channel(buffer.max(1));

    let conversion = converter.convert_with_progress(task, options, tx);
    let reporter = async {
        let mut last = None;
        while let Some(sample) = rx.recv().await {
            info!(
                "{:>5.1}% ({} / {})",
                sample.progress * 100.0,
                format_duration(sample.elapsed),
                format_duration(task.duration())
            );
            last = Some(sample);
        }
        last
    };

    let (result, last_progress) = tokio::join!(conversion, reporter);
    Ok(ConversionReport {
        result: result?,
        last_progress,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffconvert_core::{converter::MediaInfo, testing::MockConverter, RunState};
    use std::path::PathBuf;
    use std::time::Duration;

    fn task() -> ConversionTask {
        ConversionTask::new(
            "/music/a.wav",
            "/music/a.mp3",
            MediaInfo {
                path: PathBuf::from("/music/a.wav"),
                duration: Duration::from_secs(200),
                audio_bitrate_kbps: Some(1411),
            },
        )
    }

    #[tokio::test]
    async fn test_run_conversion_drains_progress() {
        let converter = MockConverter::new();
        converter.set_progress_steps(vec![0.2, 0.6, 1.0]).await;

        // buffer smaller than the number of samples
        let report = run_conversion(&converter, &task(), &ConversionOptions::default(), 1)
            .await
            .unwrap();

        assert_eq!(report.result.state, RunState::Completed);
        assert_eq!(report.last_progress.map(|s| s.progress), Some(1.0));
    }

    #[tokio::test]
    async fn test_run_conversion_start_failure() {
        let converter = MockConverter::new();
        converter.set_fail_start(true).await;

        let report = run_conversion(&converter, &task(), &ConversionOptions::default(), 4)
            .await
            .unwrap();

        assert!(!report.result.success());
        assert!(report.last_progress.is_none());
        assert_eq!(converter.conversion_count().await, 1);
    }
}
