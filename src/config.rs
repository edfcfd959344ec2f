//! Start-up settings, read from environment variables.

use std::path::PathBuf;

use crate::model::DownloadMode;

/// Path to the yt-dlp executable
pub const ENV_YTDLP: &str = "YTDLP_GUI_YTDLP";
/// Optional ffmpeg binary or directory handed to yt-dlp
pub const ENV_FFMPEG: &str = "YTDLP_GUI_FFMPEG";
/// Output folder pre-filled in the window
pub const ENV_OUTPUT_DIR: &str = "YTDLP_GUI_OUTPUT_DIR";
/// Initially selected format: `mp4`/`video` or `mp3`/`audio`
pub const ENV_MODE: &str = "YTDLP_GUI_MODE";

const DEFAULT_YTDLP: &str = if cfg!(target_os = "windows") { "yt-dlp.exe" } else { "yt-dlp" };

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ytdlp_path: PathBuf,
    pub ffmpeg_location: Option<PathBuf>,
    pub output_dir: String,
    pub mode: DownloadMode,
}

impl Settings {
    /// Reads the process environment and resolves yt-dlp on `PATH`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), |name| which::which(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    ///
    /// `resolve` finds a program on the search path; when it fails the bare
    /// program name is kept and the OS resolves it at spawn time.
    pub fn from_lookup<F, R>(lookup: F, resolve: R) -> Self
    where
        F: Fn(&str) -> Option<String>,
        R: Fn(&str) -> Option<PathBuf>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let ytdlp_path = match non_empty(ENV_YTDLP) {
            Some(path) => PathBuf::from(path),
            None => resolve(DEFAULT_YTDLP).unwrap_or_else(|| {
                tracing::warn!("{DEFAULT_YTDLP} not found on PATH; set {ENV_YTDLP} to its location");
                PathBuf::from(DEFAULT_YTDLP)
            }),
        };

        let mode = match non_empty(ENV_MODE) {
            None => DownloadMode::default(),
            Some(raw) => parse_mode(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown {ENV_MODE}, defaulting to video");
                DownloadMode::default()
            }),
        };

        Self {
            ytdlp_path,
            ffmpeg_location: non_empty(ENV_FFMPEG).map(PathBuf::from),
            output_dir: non_empty(ENV_OUTPUT_DIR).unwrap_or_default(),
            mode,
        }
    }
}

fn parse_mode(raw: &str) -> Option<DownloadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mp4" | "video" => Some(DownloadMode::Video),
        "mp3" | "audio" => Some(DownloadMode::Audio),
        _ => None,
    }
}
