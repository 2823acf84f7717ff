//! Parsing of ffmpeg `-stats` output into progress samples.
//!
//! ffmpeg writes lines such as
//! `size=  1024kB time=00:01:05.43 bitrate= 128.0kbits/s speed=41.2x`
//! to stderr. The elapsed position is the fixed-width field following
//! `time=`, formatted `HH:MM:SS.ff`.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::time::Duration;

use super::types::ProgressSample;

/// Marker preceding the elapsed timestamp.
pub const TIME_MARKER: &str = "time=";

/// Width of the timestamp field following [`TIME_MARKER`].
pub const TIME_FIELD_WIDTH: usize = 11;

static TIMESTAMP_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2}):(\d{2})(?:\.(\d+))?$").ok());

/// Extracts the elapsed position from a stats line.
///
/// Returns `None` when the marker is absent, fewer than
/// [`TIME_FIELD_WIDTH`] characters follow it, or the field is not a valid
/// timestamp (`N/A`, negative positions before the first packet).
pub fn parse_progress_time(line: &str) -> Option<Duration> {
    let start = line.find(TIME_MARKER)? + TIME_MARKER.len();
    let field: String = line[start..].chars().take(TIME_FIELD_WIDTH).collect();
    if field.chars().count() != TIME_FIELD_WIDTH {
        return None;
    }
    parse_timestamp(field.trim())
}

fn parse_timestamp(field: &str) -> Option<Duration> {
    let re = TIMESTAMP_RE.as_ref()?;
    let caps = re.captures(field)?;

    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(3)?.as_str().parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let nanos = match caps.get(4) {
        Some(frac) => {
            // Right-pad to nanosecond precision, dropping anything finer.
            let digits: String = frac.as_str().chars().chain("000000000".chars()).take(9).collect();
            digits.parse::<u32>().ok()?
        }
        None => 0,
    };

    let whole = hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)?;
    Some(Duration::new(whole, nanos))
}

/// Ratio of elapsed to total, both truncated to whole seconds.
///
/// Not clamped: ffmpeg can report positions past the probed duration.
/// Returns `None` when the total is shorter than one second.
pub fn progress_ratio(elapsed: Duration, total: Duration) -> Option<f64> {
    let total_secs = total.as_secs();
    if total_secs == 0 {
        return None;
    }
    Some(elapsed.as_secs() as f64 / total_secs as f64)
}

/// Parses one output line into a progress sample for an input of
/// `total` length.
pub fn sample_from_line(line: &str, total: Duration) -> Option<ProgressSample> {
    let elapsed = parse_progress_time(line)?;
    let progress = progress_ratio(elapsed, total)?;
    Some(ProgressSample { progress, elapsed })
}

/// Formats a duration as `HH:MM:SS` for log output.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
