//! Job runner: one download-and-convert operation on a background task.

use std::sync::Arc;
use tokio::{
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
};
use crate::downloader::{LibraryEvent, MediaLibrary};
use crate::error::Error;
use crate::logger;
use crate::model::{DownloadMode, JobEvent, JobRequest};
use crate::options::DownloadOptions;
use crate::progress::hook_events;

/// A running job as seen by the controller
pub struct JobHandle {
    /// Notifications from the job, ending with `JobEvent::Finished`
    pub events: UnboundedReceiver<JobEvent>,
}

/// Starts `request` on `runtime` and returns immediately.
///
/// The library call runs in its own task so that even a panic inside it is
/// reported as an `Exception:` line followed by `Finished`.
pub fn spawn_job(
    runtime: &Handle,
    library: Arc<dyn MediaLibrary>,
    request: JobRequest,
) -> JobHandle {
    let (tx, events) = unbounded_channel();
    let inner_rt = runtime.clone();
    runtime.spawn(async move {
        let job_tx = tx.clone();
        let inner = inner_rt.spawn(async move { run_job(library.as_ref(), &request, &job_tx).await });
        if let Err(join_err) = inner.await {
            let err = Error::Aborted(join_err.to_string());
            tracing::error!(error = %err, "download task died");
            let _ = tx.send(JobEvent::Log(format!("Exception: {err}")));
        }
        let _ = tx.send(JobEvent::Finished);
    });
    JobHandle { events }
}

/// Runs the whole job and reports through `tx`; never fails.
///
/// Does not send `Finished`; that is `spawn_job`'s job, so it happens
/// exactly once even if this future never completes normally.
pub async fn run_job(
    library: &dyn MediaLibrary,
    request: &JobRequest,
    tx: &UnboundedSender<JobEvent>,
) {
    let options = DownloadOptions::for_request(request);
    tracing::info!(url = %request.url, mode = ?request.mode, "starting job");

    if request.mode == DownloadMode::Video {
        let _ = tx.send(JobEvent::Log("Mode: MP4 (H.264 / AVC)".to_string()));
    }
    let _ = tx.send(JobEvent::Log("Starting download...".to_string()));

    let (lib_tx, lib_rx) = unbounded_channel();
    let (result, ()) = tokio::join!(
        library.download(&options, &request.url, lib_tx),
        forward_events(lib_rx, tx),
    );

    match result {
        Ok(()) => tracing::info!(url = %request.url, "job succeeded"),
        Err(err) => {
            tracing::warn!(url = %request.url, error = %err, "job failed");
            let _ = tx.send(JobEvent::Log(format!("Exception: {err}")));
        }
    }
}

/// Applies the progress hook and logger adapter to everything the library
/// reports, until the library drops its sender.
async fn forward_events(
    mut lib_rx: UnboundedReceiver<LibraryEvent>,
    tx: &UnboundedSender<JobEvent>,
) {
    while let Some(event) = lib_rx.recv().await {
        match event {
            LibraryEvent::Progress(fields) => {
                for job_event in hook_events(&fields) {
                    let _ = tx.send(job_event);
                }
            }
            LibraryEvent::Log(line) => {
                if let Some(text) = logger::forward(&line) {
                    let _ = tx.send(JobEvent::Log(text));
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Outcome, ScriptedLibrary};
    use super::*;
    use crate::model::{LogLine, Severity};
    use crate::options::{PostProcessor, AUDIO_FORMAT};
    use crate::progress::{ProgressFields, ProgressStatus};
    use std::path::PathBuf;

    fn request(mode: DownloadMode) -> JobRequest {
        JobRequest {
            url: "https://www.youtube.com/watch?v=abc".into(),
            output_dir: PathBuf::from("out"),
            mode,
        }
    }

    async fn collect(mut handle: JobHandle) -> Vec<JobEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.events.recv().await {
            events.push(event);
        }
        events
    }

    fn logs(events: &[JobEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                JobEvent::Log(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn finished_count(events: &[JobEvent]) -> usize {
        events.iter().filter(|e| **e == JobEvent::Finished).count()
    }

    #[tokio::test]
    async fn successful_video_job() {
        let downloading = ProgressFields {
            downloaded_bytes: Some(50.0),
            total_bytes: Some(100.0),
            ..ProgressFields::with_status(ProgressStatus::Downloading)
        };
        let library = Arc::new(ScriptedLibrary::new(
            vec![
                LibraryEvent::Log(LogLine::new(Severity::Debug, "[debug] noise")),
                LibraryEvent::Log(LogLine::new(Severity::Info, "[youtube] abc: Downloading webpage")),
                LibraryEvent::Progress(downloading),
                LibraryEvent::Progress(ProgressFields::with_status(ProgressStatus::Downloading)),
                LibraryEvent::Progress(ProgressFields::with_status(ProgressStatus::Finished)),
            ],
            Outcome::Succeed,
        ));

        let handle = spawn_job(&Handle::current(), library.clone(), request(DownloadMode::Video));
        let events = collect(handle).await;

        assert_eq!(
            events,
            vec![
                JobEvent::Log("Mode: MP4 (H.264 / AVC)".into()),
                JobEvent::Log("Starting download...".into()),
                JobEvent::Log("[youtube] abc: Downloading webpage".into()),
                JobEvent::Progress(50),
                JobEvent::Progress(100),
                JobEvent::Log("Download finished".into()),
                JobEvent::Finished,
            ]
        );
        assert_eq!(library.call_count(), 1);
    }

    #[tokio::test]
    async fn audio_job_passes_audio_preset() {
        let library = Arc::new(ScriptedLibrary::new(Vec::new(), Outcome::Succeed));
        let handle = spawn_job(&Handle::current(), library.clone(), request(DownloadMode::Audio));
        let events = collect(handle).await;

        assert_eq!(logs(&events), vec!["Starting download..."]);
        let calls = library.calls.lock().unwrap();
        let (options, url) = &calls[0];
        assert_eq!(url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(options.format, AUDIO_FORMAT);
        assert!(matches!(
            options.post_processor,
            PostProcessor::ExtractAudio { quality_kbps: 320, .. }
        ));
    }

    #[tokio::test]
    async fn failure_becomes_one_exception_line() {
        let library = Arc::new(ScriptedLibrary::new(
            vec![LibraryEvent::Log(LogLine::new(Severity::Error, "no network"))],
            Outcome::Fail("no network".into()),
        ));
        let handle = spawn_job(&Handle::current(), library, request(DownloadMode::Audio));
        let events = collect(handle).await;

        let exceptions: Vec<&str> = logs(&events)
            .into_iter()
            .filter(|l| l.starts_with("Exception: "))
            .collect();
        assert_eq!(exceptions, vec!["Exception: ERROR: no network"]);
        assert!(logs(&events).contains(&"Error: no network"));
        assert_eq!(finished_count(&events), 1);
        assert_eq!(events.last(), Some(&JobEvent::Finished));
    }

    #[tokio::test]
    async fn panic_still_finishes_once() {
        let library = Arc::new(ScriptedLibrary::new(Vec::new(), Outcome::Panic));
        let handle = spawn_job(&Handle::current(), library, request(DownloadMode::Video));
        let events = collect(handle).await;

        let exceptions = logs(&events)
            .into_iter()
            .filter(|l| l.starts_with("Exception: download task aborted"))
            .count();
        assert_eq!(exceptions, 1);
        assert_eq!(finished_count(&events), 1);
    }
}
