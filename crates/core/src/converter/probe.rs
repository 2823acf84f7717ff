//! Media metadata reading.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::error::ConverterError;
use super::types::MediaInfo;

/// Reads duration and bitrate from a media file.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Reads the metadata of the file at `path`.
    async fn read(&self, path: &Path) -> Result<MediaInfo, ConverterError>;
}

/// [`MetadataReader`] backed by an ffprobe binary.
#[derive(Debug, Clone)]
pub struct FfprobeReader {
    ffprobe_path: PathBuf,
}

impl Default for FfprobeReader {
    fn default() -> Self {
        Self::new(PathBuf::from("ffprobe"))
    }
}

impl FfprobeReader {
    /// Creates a reader that runs the given ffprobe binary.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe_path
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, ConverterError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
            bit_rate: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            duration: Option<String>,
            bit_rate: Option<String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| {
            ConverterError::parse_error(format!("Failed to parse ffprobe output: {}", e))
        })?;

        let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");

        let duration_secs = probe
            .format
            .duration
            .as_deref()
            .or_else(|| audio_stream.and_then(|s| s.duration.as_deref()))
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| ConverterError::parse_error("ffprobe reported no duration"))?;
        let duration = Duration::try_from_secs_f64(duration_secs).map_err(|e| {
            ConverterError::parse_error(format!("Invalid duration {}: {}", duration_secs, e))
        })?;

        // Stream bitrate first, container bitrate for formats that only report it there
        let audio_bitrate_kbps = audio_stream
            .and_then(|s| s.bit_rate.as_deref())
            .or(probe.format.bit_rate.as_deref())
            .and_then(|b| b.parse::<u64>().ok())
            .map(|b| (b / 1000) as u32);

        Ok(MediaInfo {
            path: path.to_path_buf(),
            duration,
            audio_bitrate_kbps,
        })
    }
}

#[async_trait]
impl MetadataReader for FfprobeReader {
    async fn read(&self, path: &Path) -> Result<MediaInfo, ConverterError> {
        if !path.exists() {
            return Err(ConverterError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::ProbeToolNotFound {
                        path: self.ffprobe_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(ConverterError::probe_failed(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = Self::parse_probe_output(path, &stdout)?;
        debug!(
            "Probed {:?}: duration {:?}, bitrate {:?} kbps",
            path, info.duration, info.audio_bitrate_kbps
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = r#"{
            "format": {
                "filename": "test.flac",
                "format_name": "flac",
                "duration": "180.5",
                "size": "30000000",
                "bit_rate": "1329639"
            },
            "streams": [
                {
                    "codec_type": "audio",
                    "codec_name": "flac",
                    "sample_rate": "44100",
                    "channels": 2
                }
            ]
        }"#;

        let info = FfprobeReader::parse_probe_output(Path::new("test.flac"), json).unwrap();
        assert_eq!(info.duration, Duration::from_secs_f64(180.5));
        // no stream bitrate, container value used
        assert_eq!(info.audio_bitrate_kbps, Some(1329));
    }

    #[test]
    fn test_parse_probe_output_prefers_stream_bitrate() {
        let json = r#"{
            "format": { "duration": "240.0", "bit_rate": "330000" },
            "streams": [
                { "codec_type": "video", "bit_rate": "90000" },
                { "codec_type": "audio", "bit_rate": "320000" }
            ]
        }"#;

        let info = FfprobeReader::parse_probe_output(Path::new("song.mp3"), json).unwrap();
        assert_eq!(info.audio_bitrate_kbps, Some(320));
        assert_eq!(info.duration.as_secs(), 240);
        assert_eq!(info.path, PathBuf::from("song.mp3"));
    }

    #[test]
    fn test_parse_probe_output_stream_duration_fallback() {
        let json = r#"{
            "format": {},
            "streams": [ { "codec_type": "audio", "duration": "12.25" } ]
        }"#;

        let info = FfprobeReader::parse_probe_output(Path::new("a.wav"), json).unwrap();
        assert_eq!(info.duration, Duration::from_secs_f64(12.25));
        assert_eq!(info.audio_bitrate_kbps, None);
    }

    #[test]
    fn test_parse_probe_output_without_duration() {
        let json = r#"{ "format": {}, "streams": [] }"#;
        let err = FfprobeReader::parse_probe_output(Path::new("a.wav"), json).unwrap_err();
        assert!(matches!(err, ConverterError::ParseError { .. }));
    }

    #[test]
    fn test_parse_probe_output_out_of_range_duration() {
        for duration in ["1e30", "-5.0", "NaN"] {
            let json = format!(r#"{{ "format": {{ "duration": "{}" }} }}"#, duration);
            let err = FfprobeReader::parse_probe_output(Path::new("a.wav"), &json).unwrap_err();
            assert!(matches!(err, ConverterError::ParseError { .. }), "{}", duration);
        }
    }

    #[test]
    fn test_parse_probe_output_invalid_json() {
        let err = FfprobeReader::parse_probe_output(Path::new("a.wav"), "not json").unwrap_err();
        assert!(matches!(err, ConverterError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_read_missing_input() {
        let reader = FfprobeReader::default();
        let err = reader
            .read(Path::new("/nonexistent/input.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConverterError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_missing_ffprobe() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let reader = FfprobeReader::new(PathBuf::from("/nonexistent/bin/ffprobe"));
        let err = reader.read(file.path()).await.unwrap_err();
        assert!(matches!(err, ConverterError::ProbeToolNotFound { .. }));
    }
}
