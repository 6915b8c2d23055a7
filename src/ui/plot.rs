use std::ops::RangeInclusive;

use eframe::egui::Ui;
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoint, PlotPoints};

use crate::data::model::CrossSectionSeries;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Cross-section plot (central panel)
// ---------------------------------------------------------------------------

/// Render the cross-section plot in the central panel.
///
/// Both axes are logarithmic: points are plotted as `log10` values and the
/// tick labels are rendered back as powers of ten.
pub fn cross_section_plot(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset folder to view cross sections  (File → Open dataset…)");
        });
        return;
    }

    ui.heading("BEB Cross sections");

    let records = state.selected_records();

    Plot::new("cross_section_plot")
        .legend(Legend::default())
        .x_axis_label("Energy (eV)")
        .y_axis_label("Cross section (Å²)")
        .x_axis_formatter(power_of_ten_ticks)
        .y_axis_formatter(power_of_ten_ticks)
        .label_formatter(|name, value: &PlotPoint| {
            let prefix = if name.is_empty() {
                String::new()
            } else {
                format!("{name}\n")
            };
            format!(
                "{prefix}E = {:.4} eV\nσ = {:.4} Å²",
                10f64.powf(value.x),
                10f64.powf(value.y)
            )
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (slot, record) in records.iter().enumerate() {
                let line = Line::new(log_log_points(&record.series))
                    .name(&record.id)
                    .color(state.colors.color_for(slot))
                    .width(2.0);
                plot_ui.line(line);
            }
        });
}

/// `(log10 E, log10 σ)` for every sample where both are positive.
fn log_log_points(series: &CrossSectionSeries) -> PlotPoints<'_> {
    series
        .points()
        .filter(|&(e, xs)| e > 0.0 && xs > 0.0)
        .map(|(e, xs)| [e.log10(), xs.log10()])
        .collect()
}

fn power_of_ten_ticks(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    format_power_of_ten(mark.value)
}

/// Label for an axis position given as an exponent of ten: integer
/// exponents render as `10^n`, others as the plain value.
fn format_power_of_ten(exponent: f64) -> String {
    let rounded = exponent.round();
    if (exponent - rounded).abs() < 1e-9 {
        format!("10^{}", rounded as i32)
    } else {
        let value = 10f64.powf(exponent);
        if value >= 1.0 {
            format!("{value:.0}")
        } else {
            format!("{value:.2e}")
        }
    }
}
