use std::path::PathBuf;

use eframe::egui;

use crate::data::store::DatasetStore;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AlecsApp {
    pub state: AppState,
    /// Loaded datasets, kept for the whole process.
    pub store: DatasetStore,
}

impl AlecsApp {
    /// Start the app, loading `initial_root` if one was given.
    pub fn new(initial_root: Option<PathBuf>) -> Self {
        let mut app = Self {
            state: AppState::default(),
            store: DatasetStore::default(),
        };
        if let Some(root) = initial_root {
            app.state.open_dataset(&app.store, &root);
        }
        app
    }
}

impl eframe::App for AlecsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.store);
        });

        // ---- Left side panel: molecule picker ----
        egui::SidePanel::left("molecule_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::cross_section_plot(ui, &self.state);
        });
    }
}
