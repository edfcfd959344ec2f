//! Progress hook: turns the tool's per-step status into percent events.

use crate::model::JobEvent;

/// Marker yt-dlp prints in front of every progress line (see `options.rs`)
pub const PROGRESS_MARKER: &str = "ytdlp-gui-progress:";

/// Value yt-dlp renders for a missing template field
const MISSING: &str = "NA";

/// Which step of a stream download a status line describes
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    /// `error` and anything newer versions of the tool add
    Other(String),
}

impl ProgressStatus {
    fn parse(raw: &str) -> Self {
        match raw {
            "downloading" => ProgressStatus::Downloading,
            "finished" => ProgressStatus::Finished,
            other => ProgressStatus::Other(other.to_string()),
        }
    }
}

/// Status fields reported for one download step; any of them may be absent
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressFields {
    pub status: ProgressStatus,
    pub downloaded_bytes: Option<f64>,
    pub total_bytes: Option<f64>,
    pub total_bytes_estimate: Option<f64>,
    pub percent_str: Option<String>,
}

impl ProgressFields {
    /// A `finished` report with no byte counts
    pub fn finished() -> Self {
        Self::with_status(ProgressStatus::Finished)
    }

    /// Fields with only a status set
    pub fn with_status(status: ProgressStatus) -> Self {
        Self {
            status,
            downloaded_bytes: None,
            total_bytes: None,
            total_bytes_estimate: None,
            percent_str: None,
        }
    }
}

/// Parses a progress line written by our `--progress-template`.
///
/// Layout: `<marker><status>|<downloaded>|<total>|<estimate>|<percent_str>`.
/// Returns `None` for every other line.
pub fn parse_progress_from_line(line: &str) -> Option<ProgressFields> {
    let rest = line.trim_end().strip_prefix(PROGRESS_MARKER)?;
    let mut parts = rest.splitn(5, '|');
    let status = ProgressStatus::parse(parts.next()?.trim());
    let downloaded_bytes = parse_number(parts.next());
    let total_bytes = parse_number(parts.next());
    let total_bytes_estimate = parse_number(parts.next());
    let percent_str = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != MISSING)
        .map(str::to_string);

    Some(ProgressFields {
        status,
        downloaded_bytes,
        total_bytes,
        total_bytes_estimate,
        percent_str,
    })
}

/// Whether `line` is yt-dlp's notice that the target file already exists.
///
/// No progress line is printed in that case even though the step counts
/// as finished.
pub fn is_already_downloaded(line: &str) -> bool {
    line.starts_with("[download] ") && line.trim_end().ends_with(" has already been downloaded")
}

fn parse_number(field: Option<&str>) -> Option<f64> {
    let field = field?.trim();
    if field == MISSING {
        return None;
    }
    field.parse::<f64>().ok()
}

/// Percent for a `downloading` step, in priority order:
/// exact total, then estimated total, then the preformatted percent string.
///
/// A zero or missing denominator falls through to the next source. An
/// unparsable percent string yields `None`.
pub fn compute_percent(fields: &ProgressFields) -> Option<u8> {
    if let Some(done) = fields.downloaded_bytes {
        if let Some(total) = fields.total_bytes.filter(|t| *t > 0.0) {
            return Some(to_percent(done / total * 100.0));
        }
        if let Some(estimate) = fields.total_bytes_estimate.filter(|t| *t > 0.0) {
            return Some(to_percent(done / estimate * 100.0));
        }
    }
    let raw = fields.percent_str.as_deref()?;
    let value = raw.replace('%', "").trim().parse::<f64>().ok()?;
    if value.is_finite() {
        Some(to_percent(value))
    } else {
        None
    }
}

fn to_percent(value: f64) -> u8 {
    // `as` truncates toward zero and saturates
    value.clamp(0.0, 100.0) as u8
}

/// Translates one status report into the events it produces, if any
pub fn hook_events(fields: &ProgressFields) -> Vec<JobEvent> {
    match fields.status {
        ProgressStatus::Downloading => compute_percent(fields)
            .map(JobEvent::Progress)
            .into_iter()
            .collect(),
        ProgressStatus::Finished => vec![
            JobEvent::Progress(100),
            JobEvent::Log("Download finished".to_string()),
        ],
        ProgressStatus::Other(_) => Vec::new(),
    }
}
