use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::BadgeColors;
use crate::data::classify::Bucket;
use crate::data::filter::{FilterControl, FilterSpec, Selection, Selections};
use crate::data::model::CellValue;
use crate::state::AppState;

const FILTERS_PER_ROW: usize = 3;

const WARNING: Color32 = Color32::from_rgb(255, 152, 0);
const INFO: Color32 = Color32::from_rgb(33, 150, 243);
const ERROR: Color32 = Color32::from_rgb(244, 67, 54);

/// A change requested by a filter widget, applied after rendering.
enum FilterEdit {
    Set(String, Selection),
    Clear(String),
}

// ---------------------------------------------------------------------------
// Filter grid
// ---------------------------------------------------------------------------

/// Render every filter control, grouped by bucket, and apply the edits.
pub fn filter_section(ui: &mut Ui, state: &mut AppState) {
    let mut edits = Vec::new();
    let max_unique = state.settings.max_unique;

    for (bucket, title) in [
        (Bucket::Few, "Columns with few unique values"),
        (Bucket::Many, "Columns with many unique values"),
        (Bucket::Numeric, "Numeric columns"),
        (Bucket::TooMany, "Columns with too many unique values"),
    ] {
        let specs: Vec<&FilterSpec> = state.specs.iter().filter(|s| s.bucket == bucket).collect();
        if specs.is_empty() {
            continue;
        }
        ui.add_space(6.0);
        ui.strong(title);

        egui::Grid::new(("filter_grid", bucket))
            .num_columns(FILTERS_PER_ROW)
            .spacing([16.0, 10.0])
            .show(ui, |ui: &mut Ui| {
                for row in specs.chunks(FILTERS_PER_ROW) {
                    for spec in row {
                        ui.vertical(|ui: &mut Ui| {
                            ui.set_min_width(220.0);
                            filter_cell(ui, spec, state.selections(), max_unique, &mut edits);
                        });
                    }
                    ui.end_row();
                }
            });
    }

    for edit in edits {
        match edit {
            FilterEdit::Set(col, sel) => state.set_selection(&col, sel),
            FilterEdit::Clear(col) => state.clear_selection(&col),
        }
    }
}

fn filter_cell(
    ui: &mut Ui,
    spec: &FilterSpec,
    selections: &Selections,
    max_unique: usize,
    edits: &mut Vec<FilterEdit>,
) {
    ui.label(RichText::new(format!("Filter by {}", spec.column)).strong());

    match &spec.control {
        FilterControl::Choice {
            options,
            total_distinct,
            ..
        } => {
            match spec.bucket {
                Bucket::Many => {
                    ui.label(
                        RichText::new(format!("{total_distinct} unique values"))
                            .color(WARNING)
                            .small(),
                    );
                }
                Bucket::TooMany => {
                    ui.label(
                        RichText::new(format!("{total_distinct} values (too many)"))
                            .color(ERROR)
                            .small(),
                    );
                    ui.label(
                        RichText::new(format!("Showing only first {max_unique} values"))
                            .color(INFO)
                            .small(),
                    );
                }
                _ => {}
            }
            choice_control(ui, spec, options, selections, edits);
        }
        FilterControl::Range { min, max } => {
            range_control(ui, spec, *min, *max, selections, edits);
        }
        FilterControl::Disabled(err) => {
            ui.label(RichText::new(err.to_string()).color(ERROR).small());
        }
    }
}

/// Collapsible multi-select with All / None shortcuts.
fn choice_control(
    ui: &mut Ui,
    spec: &FilterSpec,
    options: &[CellValue],
    selections: &Selections,
    edits: &mut Vec<FilterEdit>,
) {
    let selected: Vec<CellValue> = match selections.get(&spec.column) {
        Some(Selection::Values(values)) => values.clone(),
        _ => Vec::new(),
    };
    let header = format!("Select values ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(header)
        .id_salt(("choice", &spec.column))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    edits.push(FilterEdit::Set(
                        spec.column.clone(),
                        Selection::Values(options.to_vec()),
                    ));
                }
                if ui.small_button("None").clicked() {
                    edits.push(FilterEdit::Clear(spec.column.clone()));
                }
            });

            egui::ScrollArea::vertical()
                .id_salt(("choice_scroll", &spec.column))
                .max_height(200.0)
                .show(ui, |ui: &mut Ui| {
                    for val in options {
                        let mut checked = selected.contains(val);
                        if ui.checkbox(&mut checked, val.to_string()).changed() {
                            let mut next = selected.clone();
                            if checked {
                                next.push(val.clone());
                            } else {
                                next.retain(|v| v != val);
                            }
                            edits.push(FilterEdit::Set(
                                spec.column.clone(),
                                Selection::Values(next),
                            ));
                        }
                    }
                });
        });
}

/// Two sliders bounded by the column's range; the full range means inactive.
fn range_control(
    ui: &mut Ui,
    spec: &FilterSpec,
    min: f64,
    max: f64,
    selections: &Selections,
    edits: &mut Vec<FilterEdit>,
) {
    let (mut lo, mut hi) = match selections.get(&spec.column) {
        Some(Selection::Range(lo, hi)) => (*lo, *hi),
        _ => (min, max),
    };

    let lo_changed = ui
        .add(egui::Slider::new(&mut lo, min..=max).text("from"))
        .changed();
    let hi_changed = ui
        .add(egui::Slider::new(&mut hi, min..=max).text("to"))
        .changed();

    if lo_changed || hi_changed {
        if lo_changed && lo > hi {
            hi = lo;
        }
        if hi_changed && hi < lo {
            lo = hi;
        }
        edits.push(FilterEdit::Set(spec.column.clone(), Selection::Range(lo, hi)));
    }

    if (lo > min || hi < max) && ui.small_button("Reset").clicked() {
        edits.push(FilterEdit::Clear(spec.column.clone()));
    }
}

// ---------------------------------------------------------------------------
// Active filter badges
// ---------------------------------------------------------------------------

/// Show one coloured badge per active filter plus a "clear all" action.
pub fn active_filters(ui: &mut Ui, state: &mut AppState) {
    let labels = state.active_filter_labels();
    let Some(table) = &state.table else {
        return;
    };

    if labels.is_empty() {
        ui.label(format!(
            "Showing all {} rows (no filters applied)",
            state.visible_indices.len()
        ));
        return;
    }

    let colors = BadgeColors::new(table.columns(), state.settings.dark_mode);
    ui.label(RichText::new(format!("Active Filters ({}):", labels.len())).strong());
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (column, description) in &labels {
            ui.label(
                RichText::new(format!(" {column}: {description} "))
                    .color(Color32::WHITE)
                    .background_color(colors.color_for(column)),
            );
        }
    });

    let mut clear = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "Showing {} rows after applying {} filter(s)",
            state.visible_indices.len(),
            labels.len()
        ));
        clear = ui.small_button("Clear all").clicked();
    });
    if clear {
        state.clear_all_filters();
    }
}
