mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod viewer;

use std::path::PathBuf;

use app::AlecsApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional first argument: dataset root. Defaults to the working directory.
    let root = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ALeCS – BEB Cross Sections",
        options,
        Box::new(move |_cc| Ok(Box::new(AlecsApp::new(Some(root))))),
    )
}
