use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::EXPORT_FILE_NAME;
use crate::request::{Outcome, SUCCESS_MESSAGE};
use crate::state::AppState;
use crate::ui::preview;

// ---------------------------------------------------------------------------
// Left side panel – available columns
// ---------------------------------------------------------------------------

/// Render the list of available columns. Clicking a name appends it to the
/// selection box.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Available Columns");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.label(format!(
        "{} columns, {} rows",
        dataset.n_columns(),
        dataset.n_rows()
    ));
    if ui.small_button("Copy list").clicked() {
        ui.ctx().copy_text(dataset.column_names().join(", "));
    }
    ui.add_space(4.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for name in dataset.column_names() {
                let label = RichText::new(name).monospace();
                if ui.selectable_label(false, label).clicked() {
                    state.append_column(name);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Source: {}", state.source.local_path().display()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – selection form and result
// ---------------------------------------------------------------------------

pub fn selection_form(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Query-Based Column Selector");
    ui.add_space(6.0);

    if let Some(err) = &state.load_error {
        ui.label(RichText::new(err).color(Color32::RED));
        return;
    }
    if state.dataset.is_none() {
        ui.label("Loading dataset…");
        return;
    }

    ui.label("Paste column names (comma-separated)");
    ui.add(
        egui::TextEdit::multiline(&mut state.selection_text)
            .hint_text("e.g., col1, col2, col3")
            .desired_rows(3)
            .desired_width(f32::INFINITY)
            .code_editor(),
    );

    if ui.button("Apply").clicked() {
        state.apply();
    }
    ui.add_space(6.0);

    let mut save_clicked = false;
    match &state.outcome {
        Outcome::Idle => {}
        Outcome::Warning(msg) => {
            ui.label(RichText::new(msg).color(Color32::from_rgb(230, 170, 0)));
        }
        Outcome::Error(msg) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        Outcome::Success { view, artifact } => {
            ui.label(RichText::new(SUCCESS_MESSAGE).color(Color32::from_rgb(40, 160, 70)));
            egui::CollapsingHeader::new("View Selected Data")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    preview::subset_table(ui, view, state.preview_rows);
                });
            ui.horizontal(|ui: &mut Ui| {
                save_clicked = ui.button("Save Subset as CSV").clicked();
                ui.weak(format!(
                    "{} ({}, {} bytes)",
                    artifact.file_name,
                    artifact.mime,
                    artifact.bytes().len()
                ));
            });
        }
    }

    if save_clicked {
        save_file_dialog(state);
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open survey data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_local(path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save subset")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.save_subset(&path);
    }
}
