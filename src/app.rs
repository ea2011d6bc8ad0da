use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SubsetterApp {
    pub state: AppState,
}

impl SubsetterApp {
    /// Build the app and acquire the dataset once up front.
    pub fn new(config: &AppConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_dataset();
        Self { state }
    }
}

impl eframe::App for SubsetterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: available columns ----
        if self.state.dataset.is_some() {
            egui::SidePanel::left("column_panel")
                .default_width(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
        }

        // ---- Central panel: selection form ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                panels::selection_form(ui, &mut self.state);
            });
        });
    }
}
