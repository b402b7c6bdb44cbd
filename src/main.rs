#![deny(missing_docs)]

//! Entry point for the egui-based comment labeler.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use comment_labeler::config;
use comment_labeler::egui_app::ui::{EguiApp, MIN_VIEWPORT_SIZE};
use comment_labeler::logging;
use comment_labeler::session::{LabelingController, LaunchError};
use eframe::egui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if summary_requested() {
        return print_summary();
    }

    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let launch = open_controller();
    if let Err(err) = &launch {
        tracing::error!("Failed to start labeler: {err}");
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_min_inner_size(MIN_VIEWPORT_SIZE)
            .with_inner_size(egui::vec2(960.0, 720.0)),
        ..Default::default()
    };

    eframe::run_native(
        "Comment Labeler",
        native_options,
        Box::new(move |_cc| match launch {
            Ok(controller) => Ok(Box::new(EguiApp::new(controller))),
            Err(err) => Ok(Box::new(LaunchFailure {
                message: err.to_string(),
            })),
        }),
    )?;
    Ok(())
}

fn summary_requested() -> bool {
    std::env::args_os().any(|arg| arg == "--summary")
}

/// Print the summary table as JSON and exit without opening a window.
///
/// Logging stays off here so stdout carries only the JSON document.
fn print_summary() -> Result<(), Box<dyn std::error::Error>> {
    let controller = open_controller()?;
    println!("{}", serde_json::to_string_pretty(&controller.summary())?);
    Ok(())
}

fn open_controller() -> Result<LabelingController, LaunchError> {
    let config = config::load_or_default()?;
    LabelingController::open(&config)
}

/// Minimal fallback app to display initialization errors.
struct LaunchFailure {
    message: String,
}

impl eframe::App for LaunchFailure {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start the labeler");
                ui.label(self.message.as_str());
            });
        });
    }
}
