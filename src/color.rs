use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::constants::MAX_SELECTIONS;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Selection colours
// ---------------------------------------------------------------------------

/// One fixed colour per selection slot, so a curve keeps its colour while
/// other molecules are added after it.
#[derive(Debug, Clone)]
pub struct SlotColors {
    colors: Vec<Color32>,
}

impl Default for SlotColors {
    fn default() -> Self {
        Self {
            colors: generate_palette(MAX_SELECTIONS),
        }
    }
}

impl SlotColors {
    /// Colour of the `slot`-th selected molecule. Wraps past the palette.
    pub fn color_for(&self, slot: usize) -> Color32 {
        if self.colors.is_empty() {
            return Color32::LIGHT_BLUE;
        }
        self.colors[slot % self.colors.len()]
    }
}
