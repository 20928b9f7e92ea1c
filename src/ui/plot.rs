use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Statistics charts
// ---------------------------------------------------------------------------

/// Non-null counts and numeric means side by side.
pub fn statistics(ui: &mut Ui, state: &AppState) {
    let counts: Vec<(String, f64)> = state
        .non_null_counts
        .iter()
        .map(|(name, n)| (name.clone(), *n as f64))
        .collect();

    ui.columns(2, |cols| {
        cols[0].strong("Non-null values count");
        bar_chart(&mut cols[0], "non_null_counts", &counts, Color32::from_rgb(76, 175, 80));

        if !state.numeric_means.is_empty() {
            cols[1].strong("Mean values for numeric columns");
            bar_chart(
                &mut cols[1],
                "numeric_means",
                &state.numeric_means,
                Color32::from_rgb(33, 150, 243),
            );
        }
    });
}

fn bar_chart(ui: &mut Ui, id: &str, values: &[(String, f64)], color: Color32) {
    let bars: Vec<Bar> = values
        .iter()
        .enumerate()
        .map(|(i, (name, v))| Bar::new(i as f64, *v).name(name).width(0.7))
        .collect();
    let names: Vec<String> = values.iter().map(|(name, _)| name.clone()).collect();

    Plot::new(id)
        .height(200.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}
