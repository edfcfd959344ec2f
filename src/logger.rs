//! Logger adapter between the tool's console output and the GUI transcript.

use crate::model::{LogLine, Severity};

const DEBUG_PREFIX: &str = "[debug] ";
const WARNING_PREFIX: &str = "WARNING: ";
const ERROR_PREFIX: &str = "ERROR: ";

/// Assigns a severity to a raw console line, stripping the tool's own label.
pub fn classify_line(raw: &str) -> LogLine {
    let line = raw.trim_end();
    if line.starts_with(DEBUG_PREFIX) {
        LogLine::new(Severity::Debug, line)
    } else if let Some(msg) = line.strip_prefix(WARNING_PREFIX) {
        LogLine::new(Severity::Warning, msg)
    } else if let Some(msg) = line.strip_prefix(ERROR_PREFIX) {
        LogLine::new(Severity::Error, msg)
    } else {
        LogLine::new(Severity::Info, line)
    }
}

const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";

/// Where a stream is relative to an `ERROR:` report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ErrorContext {
    #[default]
    None,
    /// Right after an `ERROR:` line
    AfterError,
    /// Inside the verbose traceback that follows it
    Traceback,
}

/// Per-stream classifier that keeps a verbose traceback at error severity.
///
/// With `--verbose`, yt-dlp follows an `ERROR:` line with a Python
/// traceback: a header, indented frames, and a final unindented
/// `Type: message` line. All of it belongs to the error report.
#[derive(Debug, Default)]
pub struct LineClassifier {
    context: ErrorContext,
    last_error: Option<String>,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, raw: &str) -> LogLine {
        let line = raw.trim_end();
        let indented = line.starts_with(char::is_whitespace);

        let continues = match self.context {
            ErrorContext::None => false,
            ErrorContext::AfterError => {
                if line == TRACEBACK_HEADER {
                    self.context = ErrorContext::Traceback;
                    true
                } else {
                    indented
                }
            }
            ErrorContext::Traceback => {
                // Chained exceptions repeat the header; the first other
                // unindented line is the exception summary and ends it
                if !indented && !line.is_empty() && line != TRACEBACK_HEADER && !is_chain_note(line) {
                    self.context = ErrorContext::None;
                }
                true
            }
        };
        if continues {
            return LogLine::new(Severity::Error, line);
        }

        let log = classify_line(line);
        if log.severity == Severity::Error {
            self.context = ErrorContext::AfterError;
            self.last_error = Some(log.text.clone());
        } else {
            self.context = ErrorContext::None;
        }
        log
    }

    /// Text of the last `ERROR:` line seen, without its prefix
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

fn is_chain_note(line: &str) -> bool {
    line.starts_with("During handling of the above exception")
        || line.starts_with("The above exception was the direct cause")
}

/// Text to forward to the transcript, or `None` when the line is suppressed.
///
/// Every line is also sent to `tracing` so suppressed debug output still
/// reaches the developer log.
pub fn forward(line: &LogLine) -> Option<String> {
    match line.severity {
        Severity::Debug => {
            tracing::debug!(target: "ytdlp_gui::tool", "{}", line.text);
            None
        }
        Severity::Info => {
            tracing::trace!(target: "ytdlp_gui::tool", "{}", line.text);
            Some(line.text.clone())
        }
        Severity::Warning => {
            tracing::warn!(target: "ytdlp_gui::tool", "{}", line.text);
            Some(format!("Warning: {}", line.text))
        }
        Severity::Error => {
            tracing::error!(target: "ytdlp_gui::tool", "{}", line.text);
            Some(format!("Error: {}", line.text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_suppressed() {
        let line = LogLine::new(Severity::Debug, "[debug] Command-line config");
        assert_eq!(forward(&line), None);
    }

    #[test]
    fn info_passes_verbatim() {
        let line = LogLine::new(Severity::Info, "[youtube] abc: Downloading webpage");
        assert_eq!(forward(&line).as_deref(), Some("[youtube] abc: Downloading webpage"));
    }

    #[test]
    fn warning_and_error_are_labelled() {
        let warn = LogLine::new(Severity::Warning, "disk low");
        assert_eq!(forward(&warn).as_deref(), Some("Warning: disk low"));

        let err = LogLine::new(Severity::Error, "unable to download");
        assert_eq!(forward(&err).as_deref(), Some("Error: unable to download"));
    }

    #[test]
    fn classifies_console_prefixes() {
        assert_eq!(classify_line("[debug] yt-dlp version").severity, Severity::Debug);
        assert_eq!(
            classify_line("WARNING: disk low\n"),
            LogLine::new(Severity::Warning, "disk low")
        );
        assert_eq!(
            classify_line("ERROR: [generic] no video"),
            LogLine::new(Severity::Error, "[generic] no video")
        );
        assert_eq!(
            classify_line("[download] Destination: a.mp4"),
            LogLine::new(Severity::Info, "[download] Destination: a.mp4")
        );
    }

    #[test]
    fn traceback_after_error_stays_error() {
        let mut classifier = LineClassifier::new();
        let lines = [
            "ERROR: [youtube] abc: Video unavailable",
            "Traceback (most recent call last):",
            "  File \"yt_dlp/YoutubeDL.py\", line 1600, in wrapper",
            "    return func(self, *args, **kwargs)",
            "yt_dlp.utils.DownloadError: ERROR: [youtube] abc: Video unavailable",
            "[info] back to normal",
        ];
        let severities: Vec<Severity> = lines.iter().map(|l| classifier.classify(l).severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Error,
                Severity::Error,
                Severity::Error,
                Severity::Error,
                Severity::Error,
                Severity::Info,
            ]
        );
        assert_eq!(classifier.last_error(), Some("[youtube] abc: Video unavailable"));

        let forwarded = forward(&classifier.classify("ERROR: boom"));
        assert_eq!(forwarded.as_deref(), Some("Error: boom"));
        let frame = forward(&classifier.classify("  File \"x.py\", line 1, in f"));
        assert_eq!(frame.as_deref(), Some("Error:   File \"x.py\", line 1, in f"));
    }

    #[test]
    fn chained_traceback_kept_together() {
        let mut classifier = LineClassifier::new();
        classifier.classify("ERROR: outer");
        for line in [
            "Traceback (most recent call last):",
            "  File \"a.py\", line 1, in f",
            "",
            "During handling of the above exception, another exception occurred:",
            "",
            "Traceback (most recent call last):",
            "  File \"b.py\", line 2, in g",
            "RuntimeError: inner",
        ] {
            assert_eq!(classifier.classify(line).severity, Severity::Error, "{line:?}");
        }
        assert_eq!(classifier.classify("[download] next").severity, Severity::Info);
    }

    #[test]
    fn unindented_line_after_error_is_not_swallowed() {
        let mut classifier = LineClassifier::new();
        classifier.classify("ERROR: first");
        assert_eq!(
            classifier.classify("WARNING: later"),
            LogLine::new(Severity::Warning, "later")
        );
        assert_eq!(classifier.classify("   indented").severity, Severity::Info);
    }

    #[test]
    fn classified_warning_round_trips_to_label() {
        let forwarded = forward(&classify_line("WARNING: disk low"));
        assert_eq!(forwarded.as_deref(), Some("Warning: disk low"));
    }
}
