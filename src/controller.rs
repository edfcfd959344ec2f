//! Presenter state behind the window: inputs, progress, transcript and the
//! single job slot.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use rfd::FileDialog;
use tokio::{runtime::Handle, sync::mpsc::error::TryRecvError};
use crate::downloader::MediaLibrary;
use crate::model::{DownloadMode, JobEvent, JobRequest, JobState};
use crate::runner::{spawn_job, JobHandle};

/// Something that can ask the user for a folder
pub trait FolderPicker {
    /// `None` when the user cancels
    fn pick_folder(&self, start: &Path) -> Option<PathBuf>;
}

/// Native dialog via `rfd`
pub struct NativeFolderPicker;

impl FolderPicker for NativeFolderPicker {
    fn pick_folder(&self, start: &Path) -> Option<PathBuf> {
        let mut dialog = FileDialog::new().set_title("Select Output Folder");
        if start.is_dir() {
            dialog = dialog.set_directory(start);
        }
        dialog.pick_folder()
    }
}

pub struct Controller {
    /// Text in the URL field
    pub url: String,
    /// Text in the output folder field
    pub output_dir: String,
    /// Selected radio button
    pub mode: DownloadMode,
    progress: u8,
    log: Vec<String>,
    state: JobState,
    job: Option<JobHandle>,
    library: Arc<dyn MediaLibrary>,
    runtime: Handle,
}

impl Controller {
    pub fn new(library: Arc<dyn MediaLibrary>, runtime: Handle) -> Self {
        Self {
            url: String::new(),
            output_dir: String::new(),
            mode: DownloadMode::default(),
            progress: 0,
            log: Vec::new(),
            state: JobState::Idle,
            job: None,
            library,
            runtime,
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Whether the Download button is clickable
    pub fn start_enabled(&self) -> bool {
        self.state != JobState::Running
    }

    /// Validates the inputs and launches one job.
    ///
    /// Returns `false` (after logging why) when nothing was started.
    pub fn start_job(&mut self) -> bool {
        if !self.start_enabled() {
            tracing::debug!("start ignored, a job is already running");
            return false;
        }

        let url = self.url.trim().to_string();
        if url.is_empty() {
            self.log.push("Please enter a URL".to_string());
            return false;
        }

        let output_dir = self.output_dir.trim().to_string();
        if output_dir.is_empty() {
            self.log.push("Please select an output folder".to_string());
            return false;
        }

        let request = JobRequest {
            url,
            output_dir: PathBuf::from(output_dir),
            mode: self.mode,
        };

        self.progress = 0;
        self.log.clear();
        self.state = JobState::Running;
        self.job = Some(spawn_job(&self.runtime, Arc::clone(&self.library), request));
        true
    }

    pub fn on_progress(&mut self, percent: u8) {
        self.progress = percent.min(100);
    }

    pub fn on_log(&mut self, line: String) {
        self.log.push(line);
    }

    pub fn on_job_finished(&mut self) {
        self.job = None;
        self.state = JobState::Finished;
        self.log.push("Ready".to_string());
    }

    /// Opens the picker; a cancelled dialog leaves the folder unchanged
    pub fn choose_output_directory(&mut self, picker: &dyn FolderPicker) {
        if let Some(folder) = picker.pick_folder(Path::new(self.output_dir.trim())) {
            self.output_dir = folder.display().to_string();
        }
    }

    /// Applies every event the job has sent so far, without blocking.
    ///
    /// Returns `true` if anything changed.
    pub fn poll_events(&mut self) -> bool {
        let mut changed = false;
        while let Some(job) = self.job.as_mut() {
            match job.events.try_recv() {
                Ok(JobEvent::Progress(percent)) => self.on_progress(percent),
                Ok(JobEvent::Log(line)) => self.on_log(line),
                Ok(JobEvent::Finished) => self.on_job_finished(),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("job channel closed without a finish signal");
                    self.on_job_finished();
                }
            }
            changed = true;
        }
        changed
    }
}
