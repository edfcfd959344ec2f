//! Error types for the download job.
//!
//! Every variant ends up as a single `Exception: ...` line in the GUI log, so
//! the `Display` text is what the user reads.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for job operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The yt-dlp executable could not be started (usually: not installed)
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the tool's output or waiting on it failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool ran but reported failure
    #[error("{}", exit_message(*code, message.as_deref()))]
    Exited {
        code: Option<i32>,
        /// Last `ERROR:` line printed by the tool, if any
        message: Option<String>,
    },

    /// The download task died before returning
    #[error("download task aborted: {0}")]
    Aborted(String),
}

fn exit_message(code: Option<i32>, message: Option<&str>) -> String {
    match (message, code) {
        (Some(msg), _) => format!("ERROR: {msg}"),
        (None, Some(code)) => format!("yt-dlp exited with status {code}"),
        (None, None) => "yt-dlp was terminated by a signal".to_string(),
    }
}
