use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Table;

/// Render `rows` of `table` (indices into the table, in display order).
pub fn data_table(ui: &mut Ui, id: &str, table: &Table, rows: &[usize], max_height: f32) {
    if table.width() == 0 {
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(40.0))
            .columns(Column::auto().at_least(60.0).clip(true), table.width())
            .min_scrolled_height(0.0)
            .max_scroll_height(max_height)
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                for name in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let source_row = rows[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.weak(source_row.to_string());
                    });
                    for value in &table.rows()[source_row] {
                        row.col(|ui: &mut Ui| {
                            if value.is_null() {
                                ui.weak("null");
                            } else {
                                ui.label(value.to_string());
                            }
                        });
                    }
                });
            });
    });
}
