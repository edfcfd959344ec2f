//! The two fixed download presets and their yt-dlp command line.

use std::path::Path;

use crate::model::{DownloadMode, JobRequest};
use crate::progress::PROGRESS_MARKER;

/// Format selector for MP3: best audio-only stream, else best overall
pub const AUDIO_FORMAT: &str = "bestaudio/best";

/// Format selector for MP4: H.264 video + M4A audio, falling back to any MP4
/// video + best audio, then a single MP4 file, then anything
pub const VIDEO_FORMAT: &str =
    "bestvideo[ext=mp4][vcodec^=avc1]+bestaudio[ext=m4a]/bestvideo[ext=mp4]+bestaudio/best[ext=mp4]/best";

/// `title.ext` inside the output folder
pub const OUTPUT_NAME_TEMPLATE: &str = "%(title)s.%(ext)s";

/// ffmpeg step yt-dlp runs after the raw streams are downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Extract the audio track and transcode it
    ExtractAudio { codec: String, quality_kbps: u32 },
    /// Convert the merged file into another container
    VideoConvert { format: String },
}

/// Everything handed to the external tool for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub output_template: String,
    pub format: String,
    pub merge_output_format: Option<String>,
    pub post_processor: PostProcessor,
    pub verbose: bool,
}

impl DownloadOptions {
    /// Builds the preset for the request's mode
    pub fn for_request(request: &JobRequest) -> Self {
        match request.mode {
            DownloadMode::Audio => Self::audio(&request.output_dir),
            DownloadMode::Video => Self::video(&request.output_dir),
        }
    }

    pub fn audio(output_dir: &Path) -> Self {
        Self {
            output_template: output_template(output_dir),
            format: AUDIO_FORMAT.to_string(),
            merge_output_format: None,
            post_processor: PostProcessor::ExtractAudio {
                codec: "mp3".to_string(),
                quality_kbps: 320,
            },
            verbose: true,
        }
    }

    pub fn video(output_dir: &Path) -> Self {
        Self {
            output_template: output_template(output_dir),
            format: VIDEO_FORMAT.to_string(),
            merge_output_format: Some("mp4".to_string()),
            post_processor: PostProcessor::VideoConvert {
                format: "mp4".to_string(),
            },
            verbose: true,
        }
    }

    /// yt-dlp arguments for these options, without the URL
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_owned(),
            self.format.clone(),
            "-o".to_owned(),
            self.output_template.clone(),
        ];

        // One progress line per update, in a layout `progress.rs` can parse
        args.push("--newline".to_owned());
        args.push("--no-colors".to_owned());
        args.push("--encoding".to_owned());
        args.push("utf-8".to_owned());
        args.push("--progress-template".to_owned());
        args.push(format!(
            "download:{PROGRESS_MARKER}%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress._percent_str)s"
        ));

        if self.verbose {
            args.push("--verbose".to_owned());
        }

        if let Some(merge) = &self.merge_output_format {
            args.push("--merge-output-format".to_owned());
            args.push(merge.clone());
        }

        match &self.post_processor {
            PostProcessor::ExtractAudio { codec, quality_kbps } => {
                args.push("-x".to_owned());
                args.push("--audio-format".to_owned());
                args.push(codec.clone());
                args.push("--audio-quality".to_owned());
                args.push(format!("{quality_kbps}K"));
            }
            PostProcessor::VideoConvert { format } => {
                args.push("--recode-video".to_owned());
                args.push(format.clone());
            }
        }
        args
    }
}

fn output_template(output_dir: &Path) -> String {
    output_dir.join(OUTPUT_NAME_TEMPLATE).display().to_string()
}
