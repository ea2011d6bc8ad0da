use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Subset preview (table)
// ---------------------------------------------------------------------------

/// Render at most `max_rows` rows of `view` as a striped table.
pub fn subset_table(ui: &mut Ui, view: &Dataset, max_rows: usize) {
    let shown = view.n_rows().min(max_rows);
    let text_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .max_scroll_height(320.0)
        .columns(TableColumn::auto().at_least(60.0), view.n_columns())
        .header(text_height + 4.0, |mut header| {
            for name in view.column_names() {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(text_height, shown, |mut row| {
                let r = row.index();
                for c in 0..view.n_columns() {
                    row.col(|ui| {
                        match view.cell(r, c) {
                            Some(CellValue::Null) | None => ui.weak("NaN"),
                            Some(value) => ui.label(value.to_string()),
                        };
                    });
                }
            });
        });

    if shown < view.n_rows() {
        ui.weak(format!("Showing first {shown} of {} rows", view.n_rows()));
    }
}
