use std::path::PathBuf;

/// Output format chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    /// H.264 video in an MP4 container
    #[default]
    Video,
    /// Audio only, transcoded to MP3
    Audio,
}

impl DownloadMode {
    /// Label shown next to the radio button
    pub fn label(self) -> &'static str {
        match self {
            DownloadMode::Video => "MP4 (Video)",
            DownloadMode::Audio => "MP3 (Audio only)",
        }
    }
}

/// One download-and-convert request, fixed once the job starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    /// Trimmed, non-empty video URL
    pub url: String,
    /// Folder the external tool writes into
    pub output_dir: PathBuf,
    /// Video or audio preset
    pub mode: DownloadMode,
}

/// Severity of a line reported by the external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Never shown in the GUI
    Debug,
    Info,
    Warning,
    Error,
}

/// A single log line from the external tool, before it reaches the GUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub severity: Severity,
}

impl LogLine {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Notification sent from a running job to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// Percent complete for the current stream (0 to 100)
    Progress(u8),
    /// A line for the log transcript
    Log(String),
    /// Sent exactly once when the job ends, however it ends
    Finished,
}

/// Lifecycle of the controller's single job slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    /// No job has been started yet
    #[default]
    Idle,
    /// A job is running and the start control is disabled
    Running,
    /// The last job has signalled completion
    Finished,
}
