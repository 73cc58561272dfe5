//! Console progress reporting for yt-dlp progress hooks.
//!
//! yt-dlp calls each registered hook with a status dict on every tick. [`ProgressEvent`] is the
//! typed subset of that dict; [`write_event`] turns it into terminal output:
//!
//! ```text
//! 50.0%  500.0B / 1000.0B  1.2MiB/s  ETA 10s
//! ```
//!
//! The line is redrawn in place with `\r` until a `finished` event ends it.

use std::io::{self, Write};

const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

pub const FINISHED_MESSAGE: &str = "Download complete, now post-processing...";

/// The `status` field of a yt-dlp progress dict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    /// Anything else yt-dlp reports (e.g. `error`); ignored by the reporter
    Other(String),
}

impl From<&str> for ProgressStatus {
    fn from(status: &str) -> Self {
        match status {
            "downloading" => Self::Downloading,
            "finished" => Self::Finished,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One progress tick as delivered by yt-dlp.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    /// `_percent_str`
    pub percent: Option<String>,
    /// `_speed_str`
    pub speed: Option<String>,
    /// `_eta_str`
    pub eta: Option<String>,
    /// `downloaded_bytes`
    pub downloaded_bytes: Option<f64>,
    /// `total_bytes`
    pub total_bytes: Option<f64>,
    /// `total_bytes_estimated` (may be fractional)
    pub total_bytes_estimated: Option<f64>,
}

impl ProgressEvent {
    /// An event with the given status and no counters.
    pub fn new(status: ProgressStatus) -> Self {
        Self {
            status,
            percent: None,
            speed: None,
            eta: None,
            downloaded_bytes: None,
            total_bytes: None,
            total_bytes_estimated: None,
        }
    }

    /// Exact total if known, otherwise the estimate. Zero counts as unknown.
    pub fn total(&self) -> Option<f64> {
        self.total_bytes
            .filter(|&n| n > 0.0)
            .or(self.total_bytes_estimated)
            .filter(|&n| n > 0.0)
    }
}

/// Human friendly byte size with binary units, e.g. `3.4MiB`.
pub fn format_bytes(bytes: f64) -> String {
    let mut num = bytes;
    for unit in UNITS {
        if num.abs() < 1024.0 {
            return format!("{num:.1}{unit}B");
        }
        num /= 1024.0;
    }
    format!("{num:.1}YiB")
}

/// The status line for a `downloading` event, `None` for any other status.
///
/// Downloaded bytes may exceed the total; the numbers are printed as reported.
pub fn status_line(event: &ProgressEvent) -> Option<String> {
    if event.status != ProgressStatus::Downloading {
        return None;
    }

    let percent = event.percent.as_deref().unwrap_or("?%");
    let speed = event.speed.as_deref().unwrap_or("? B/s");
    let eta = event.eta.as_deref().unwrap_or("?s");

    let downloaded = format_bytes(event.downloaded_bytes.unwrap_or(0.0));
    let size = match event.total() {
        Some(total) => format!("{downloaded} / {}", format_bytes(total)),
        None => downloaded,
    };

    Some(format!("{percent}  {size}  {speed}  ETA {eta}"))
}

/// Write the terminal output for one event and flush.
pub fn write_event<W: Write>(out: &mut W, event: &ProgressEvent) -> io::Result<()> {
    match event.status {
        ProgressStatus::Downloading => {
            if let Some(line) = status_line(event) {
                write!(out, "\r{line}")?;
            }
        }
        ProgressStatus::Finished => writeln!(out, "\n{FINISHED_MESSAGE}")?,
        ProgressStatus::Other(ref status) => {
            tracing::trace!(status, "ignoring progress status");
            return Ok(());
        }
    }
    out.flush()
}

/// Progress hook that animates a single line on stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn stdout() -> impl Fn(&ProgressEvent) + Send + Sync + 'static {
        |event: &ProgressEvent| ConsoleReporter.report(event)
    }

    /// Report one event. Write failures are logged and dropped so the download continues.
    pub fn report(&self, event: &ProgressEvent) {
        let mut out = io::stdout().lock();
        if let Err(err) = write_event(&mut out, event) {
            tracing::debug!(%err, "failed to write progress");
        }
    }
}
