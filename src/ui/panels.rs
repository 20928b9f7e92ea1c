use anyhow::Context;
use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::{MAX_UNIQUE_RANGE, RANDOM_COUNT_RANGE};
use crate::data::export::ExportFormat;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – source and settings
// ---------------------------------------------------------------------------

/// Render the left panel: sheet URL, load options and settings.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Google Sheet Viewer");
    ui.separator();

    ui.label("Enter your public Google Sheet URL");
    let url_edit = ui.add(
        egui::TextEdit::singleline(&mut state.source_url)
            .hint_text("https://docs.google.com/spreadsheets/d/your_sheet_id/edit#gid=0")
            .desired_width(f32::INFINITY),
    );
    let submitted = url_edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

    ui.checkbox(&mut state.skip_first_row, "Start from row 2 (skip first row)")
        .on_hover_text("Ignore the first row and use the second row as header");

    let can_load = !state.source_url.trim().is_empty();
    if ui.add_enabled(can_load, egui::Button::new("Load")).clicked() || (submitted && can_load) {
        state.load();
    }

    ui.separator();
    ui.strong("Filter Settings");

    let mut settings = state.settings.clone();
    ui.add(egui::Slider::new(&mut settings.max_unique, MAX_UNIQUE_RANGE).text("Max unique values"))
        .on_hover_text("Maximum number of unique values to display in dropdown filters");
    ui.checkbox(&mut settings.filter_all_columns, "Enable filters for all columns")
        .on_hover_text("If unchecked, only columns with few unique values will have filters");
    ui.checkbox(&mut settings.numeric_ranges, "Range filters for numeric columns");

    ui.separator();
    ui.strong("Settings");
    ui.add(egui::Slider::new(&mut settings.random_count, RANDOM_COUNT_RANGE).text("Random rows"));
    ui.checkbox(&mut settings.show_stats, "Show statistics");
    ui.checkbox(&mut settings.dark_mode, "Dark mode");
    state.update_settings(settings);

    ui.separator();
    ui.strong("About");
    ui.label("View, filter and sample data from public Google Sheets.");
    ui.add_space(4.0);
    ui.strong("Instructions");
    ui.label(
        "1. Enter your Google Sheet URL\n\
         2. Choose whether to start from row 1 or row 2\n\
         3. Filter any number of columns; rows must match all filters\n\
         4. Select random rows from the filtered data\n\
         5. Save the filtered data as CSV or Excel",
    );
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        match &state.table {
            Some(table) => {
                ui.label(format!(
                    "{} rows loaded, {} visible",
                    table.len(),
                    state.visible_indices.len()
                ));
            }
            None => {
                ui.label("No sheet loaded");
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        } else if let Some(msg) = &state.notice {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::from_rgb(76, 175, 80)));
        }
    });
}

// ---------------------------------------------------------------------------
// Save dialog
// ---------------------------------------------------------------------------

/// Export the filtered rows and write them where the user chooses.
pub fn save_export_dialog(state: &mut AppState, format: ExportFormat) {
    let Some(bytes) = state.export(format) else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title(format!("Save filtered data as {}", format.label()))
        .set_file_name(format.default_file_name())
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        let written = std::fs::write(&path, &bytes)
            .with_context(|| format!("writing {}", path.display()));
        match written {
            Ok(()) => {
                log::info!(
                    "saved {} rows to {}",
                    state.visible_indices.len(),
                    path.display()
                );
                state.status_message = None;
                state.notice = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save export: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
