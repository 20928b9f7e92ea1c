use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::export::ExportFormat;
use crate::data::loader::SheetLoader;
use crate::data::sample::SampleOutcome;
use crate::state::AppState;
use crate::ui::{filters, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SheetViewerApp {
    pub state: AppState,
    /// Theme currently installed in the context.
    applied_dark_mode: Option<bool>,
}

impl SheetViewerApp {
    pub fn new(loader: SheetLoader) -> Self {
        Self {
            state: AppState::new(loader),
            applied_dark_mode: None,
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        let dark = self.state.settings.dark_mode;
        if self.applied_dark_mode != Some(dark) {
            ctx.set_visuals(if dark {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            });
            self.applied_dark_mode = Some(dark);
        }
    }
}

impl eframe::App for SheetViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);

        // ---- Top panel: status bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: source + settings ----
        egui::SidePanel::left("settings_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                    panels::side_panel(ui, &mut self.state);
                });
            });

        // ---- Central panel: overview, filters, results ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    main_view(ui, &mut self.state);
                });
        });
    }
}

fn main_view(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Google Sheet Data Viewer");

    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Enter a public Google Sheet URL in the side panel to get started.");
        });
        return;
    };

    // ---- Overview ----
    ui.separator();
    let header_mode = if state.skip_first_row {
        "Starting from row 2 (skipping first row)"
    } else {
        "Starting from row 1"
    };
    ui.label(format!(
        "Loaded {} rows and {} columns. {header_mode}.",
        table.len(),
        table.width()
    ));

    if state.settings.show_stats {
        ui.add_space(6.0);
        ui.heading("Data Statistics");
        plot::statistics(ui, state);
    }

    // ---- Filters ----
    ui.separator();
    ui.heading("Filter Data");
    ui.label(
        "Select filter values for any number of columns. Rows must match ALL selected criteria.",
    );
    filters::filter_section(ui, state);

    // ---- Filtered data ----
    ui.separator();
    ui.heading("Filtered Data");
    filters::active_filters(ui, state);

    ui.horizontal(|ui: &mut Ui| {
        let random_count = state.settings.random_count;
        if ui.button(format!("Select {random_count} Random Rows")).clicked() {
            state.sample();
        }
        for format in [ExportFormat::Csv, ExportFormat::Xlsx] {
            if ui.button(format!("Download as {}", format.label())).clicked() {
                panels::save_export_dialog(state, format);
            }
        }
    });

    sample_view(ui, state);

    if let Some(table) = &state.table {
        ui.add_space(6.0);
        table::data_table(ui, "filtered_table", table, &state.visible_indices, 500.0);
    }
}

fn sample_view(ui: &mut Ui, state: &AppState) {
    let Some(outcome) = &state.sample else {
        return;
    };
    match outcome {
        SampleOutcome::Empty => {
            ui.label(
                RichText::new("No data to select after applying filters")
                    .color(egui::Color32::from_rgb(255, 152, 0)),
            );
        }
        SampleOutcome::Full(t) => {
            ui.label(format!(
                "All {} rows selected as there are fewer than {} rows after filtering",
                t.len(),
                state.settings.random_count
            ));
        }
        SampleOutcome::Sampled(t) => {
            ui.label(format!(
                "Randomly selected {} rows from filtered data",
                t.len()
            ));
        }
    }
    if let Some(t) = outcome.table() {
        let rows: Vec<usize> = (0..t.len()).collect();
        table::data_table(ui, "sample_table", t, &rows, 400.0);
    }
}
