use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, lightness);
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
// Badge colours: one per column of the sheet
// ---------------------------------------------------------------------------

/// Maps each column name to a stable badge colour for the active-filter list.
#[derive(Debug, Clone)]
pub struct BadgeColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl BadgeColors {
    /// Lighter badges on a dark background, darker ones on a light background.
    pub fn new(columns: &[String], dark_mode: bool) -> Self {
        let lightness = if dark_mode { 0.70 } else { 0.40 };
        let mapping = columns
            .iter()
            .cloned()
            .zip(generate_palette(columns.len(), lightness))
            .collect();
        BadgeColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, column: &str) -> Color32 {
        self.mapping
            .get(column)
            .copied()
            .unwrap_or(self.default_color)
    }
}
