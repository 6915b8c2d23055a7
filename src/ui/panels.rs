use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::constants::MAX_SELECTIONS;
use crate::data::export::{write_csv, CSV_FILE_NAME};
use crate::data::store::DatasetStore;
use crate::state::AppState;
use crate::viewer::{write_viewer_html, VIEWER_FILE_NAME};

// ---------------------------------------------------------------------------
// Left side panel – molecule picker
// ---------------------------------------------------------------------------

/// Render the left molecule selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Molecules");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{}/{MAX_SELECTIONS} selected", state.selected.len()));
        if ui.small_button("Clear").clicked() {
            state.clear_selection();
        }
    });
    ui.separator();

    if dataset.is_empty() {
        ui.label("No molecules found in this dataset.");
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for record in dataset.iter_ordered() {
                let selected = state.is_selected(&record.id);
                let mut text = RichText::new(&record.label);
                if let Some(slot) = state.selected.iter().position(|s| *s == record.id) {
                    text = text.color(state.colors.color_for(slot)).strong();
                }

                let enabled = selected || state.can_select_more();
                let mut checked = selected;
                let hover = match record.mass {
                    Some(m) => format!("≈{m:.0} u, {} points", record.series.len()),
                    None => format!("mass unknown, {} points", record.series.len()),
                };
                ui.horizontal(|ui: &mut Ui| {
                    let response = ui
                        .add_enabled(enabled, egui::Checkbox::new(&mut checked, text))
                        .on_hover_text(hover);
                    if record.label != record.id {
                        ui.label(RichText::new(&record.id).weak().small());
                    }
                    if response.changed() {
                        state.toggle_selection(&record.id);
                    }
                });
            }

            if !dataset.diagnostics.is_empty() {
                ui.separator();
                egui::CollapsingHeader::new(
                    RichText::new(format!("Problems ({})", dataset.diagnostics.len()))
                        .color(Color32::YELLOW),
                )
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for diagnostic in &dataset.diagnostics {
                        ui.label(diagnostic.to_string());
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, store: &DatasetStore) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_dataset_dialog(state, store);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.data_root.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload(store);
                ui.close_menu();
            }
            ui.separator();
            let has_selection = !state.selected.is_empty();
            if ui
                .add_enabled(has_selection, egui::Button::new("Export CSV…"))
                .clicked()
            {
                export_csv_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_selection, egui::Button::new("Export 3-D viewer…"))
                .clicked()
            {
                export_viewer_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} molecules loaded, {} selected",
                ds.len(),
                state.selected.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_dataset_dialog(state: &mut AppState, store: &DatasetStore) {
    let folder = rfd::FileDialog::new()
        .set_title("Open ALeCS dataset folder")
        .pick_folder();

    if let Some(root) = folder {
        state.open_dataset(store, &root);
    }
}

pub fn export_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download data as CSV")
        .set_file_name(CSV_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let result = write_csv(&path, &state.csv_columns());
        if let Err(e) = result {
            log::error!("CSV export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn export_viewer_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export 3-D structure viewer")
        .set_file_name(VIEWER_FILE_NAME)
        .add_filter("HTML", &["html"])
        .save_file();

    if let Some(path) = file {
        let result = write_viewer_html(&path, &state.selected_records());
        if let Err(e) = result {
            log::error!("Viewer export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
