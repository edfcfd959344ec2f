//! Desktop front-end for yt-dlp: one URL, one folder, MP4 or MP3

// Start-up settings from the environment
mod config;
// Presenter state and the single job slot
mod controller;
// External tool adapter (yt-dlp process)
mod downloader;
// Error types surfaced as "Exception:" lines
mod error;
// Severity handling for the tool's console output
mod logger;
// tracing subscriber setup
mod logging;
// Shared data types
mod model;
// The two download presets
mod options;
// Progress hook
mod progress;
// Background job execution
mod runner;

use config::Settings;
use controller::{Controller, NativeFolderPicker};
use downloader::YtDlp;
use model::{DownloadMode, JobState};

// eframe/egui for GUI application framework
use eframe::{egui, App, Frame};
// OnceCell for single-time runtime initialization
use once_cell::sync::OnceCell;
use std::{sync::Arc, time::Duration};
use tokio::runtime::Runtime;
use egui::Visuals;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Program entry point: initializes logging and runtime, then launches GUI
fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let runtime = RUNTIME.get_or_try_init(Runtime::new)?;
    let settings = Settings::from_env();
    tracing::info!(ytdlp = %settings.ytdlp_path.display(), "starting yt-dlp GUI");

    let library = YtDlp::new(settings.ytdlp_path.clone())
        .with_ffmpeg_location(settings.ffmpeg_location.clone());
    let mut controller = Controller::new(Arc::new(library), runtime.handle().clone());
    controller.output_dir = settings.output_dir;
    controller.mode = settings.mode;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 420.0])
            .with_min_inner_size([500.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        "yt-dlp GUI",
        options,
        Box::new(move |cc| {
            // Use dark theme visuals
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(DownloaderApp { controller })
        }),
    )?;
    Ok(())
}

/// The window; all state lives in the controller
struct DownloaderApp {
    controller: Controller,
}

impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let ctrl = &mut self.controller;
        ctrl.poll_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add(
                egui::TextEdit::singleline(&mut ctrl.url)
                    .hint_text("Enter Youtube URL")
                    .desired_width(f32::INFINITY),
            );

            ui.label("Output folder:");
            ui.horizontal(|ui| {
                let mut shown = ctrl.output_dir.as_str();
                let browse_width = 90.0;
                ui.add(
                    egui::TextEdit::singleline(&mut shown)
                        .desired_width(ui.available_width() - browse_width),
                );
                if ui.button("Browse...").clicked() {
                    ctrl.choose_output_directory(&NativeFolderPicker);
                }
            });

            if ui
                .add_enabled(ctrl.start_enabled(), egui::Button::new("Download"))
                .clicked()
            {
                ctrl.start_job();
            }

            ui.horizontal(|ui| {
                for mode in [DownloadMode::Video, DownloadMode::Audio] {
                    ui.radio_value(&mut ctrl.mode, mode, mode.label());
                }
            });

            ui.add(
                egui::ProgressBar::new(f32::from(ctrl.progress()) / 100.0).show_percentage(),
            );

            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in ctrl.log_lines() {
                        ui.label(line);
                    }
                });
        });

        // Keep polling the job channel while it runs
        if ctrl.state() == JobState::Running {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
