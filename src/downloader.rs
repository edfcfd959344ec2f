use std::{path::PathBuf, process::Stdio};
use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
    sync::mpsc::UnboundedSender,
};
use crate::error::{Error, Result};
use crate::logger::LineClassifier;
use crate::model::LogLine;
use crate::options::DownloadOptions;
use crate::progress::{is_already_downloaded, parse_progress_from_line, ProgressFields};

/// Callback traffic from the external tool while it works
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    /// Progress hook invocation
    Progress(ProgressFields),
    /// Logger invocation
    Log(LogLine),
}

/// The external download-and-process library.
///
/// `download` runs to completion for one URL, reporting through `events`
/// as it goes. The job runner calls it exactly once per job.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn download(
        &self,
        options: &DownloadOptions,
        url: &str,
        events: UnboundedSender<LibraryEvent>,
    ) -> Result<()>;
}

/// `MediaLibrary` backed by the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    ffmpeg_location: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ffmpeg_location: None,
        }
    }

    /// Directory or binary passed to yt-dlp as `--ffmpeg-location`
    pub fn with_ffmpeg_location(mut self, location: Option<PathBuf>) -> Self {
        self.ffmpeg_location = location;
        self
    }

    fn command_args(&self, options: &DownloadOptions, url: &str) -> Vec<String> {
        let mut args = options.to_args();
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".to_owned());
            args.push(ffmpeg.display().to_string());
        }
        // Keeps URLs starting with '-' from being read as options
        args.push("--".to_owned());
        args.push(url.to_owned());
        args
    }
}

#[async_trait]
impl MediaLibrary for YtDlp {
    async fn download(
        &self,
        options: &DownloadOptions,
        url: &str,
        events: UnboundedSender<LibraryEvent>,
    ) -> Result<()> {
        let args = self.command_args(options, url);
        tracing::debug!(program = %self.program.display(), ?args, "spawning yt-dlp");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Aborted("yt-dlp stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Aborted("yt-dlp stderr was not captured".into()))?;

        let (out_errors, err_errors) = tokio::try_join!(
            pump_lines(stdout, events.clone()),
            pump_lines(stderr, events),
        )?;
        let status = child.wait().await?;

        if status.success() {
            tracing::info!(url, "yt-dlp finished");
            Ok(())
        } else {
            let message = err_errors.or(out_errors);
            tracing::warn!(url, code = ?status.code(), "yt-dlp failed");
            Err(Error::Exited {
                code: status.code(),
                message,
            })
        }
    }
}

/// Forwards every line of one output stream as a `LibraryEvent` and returns
/// the last error message seen on it.
///
/// Lines are decoded lossily: yt-dlp may print titles in the locale
/// encoding, and one bad byte must not abort the download.
async fn pump_lines<R>(stream: R, events: UnboundedSender<LibraryEvent>) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut classifier = LineClassifier::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);

        // The receiver only goes away if the job was torn down; keep draining
        // so the child never blocks on a full pipe.
        if let Some(fields) = parse_progress_from_line(line) {
            let _ = events.send(LibraryEvent::Progress(fields));
            continue;
        }
        let _ = events.send(LibraryEvent::Log(classifier.classify(line)));
        // yt-dlp skips the progress report for files already on disk but
        // still counts the step as finished
        if is_already_downloaded(line) {
            let _ = events.send(LibraryEvent::Progress(ProgressFields::finished()));
        }
    }
    Ok(classifier.last_error().map(str::to_string))
}
