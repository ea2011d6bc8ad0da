mod app;
mod config;
mod data;
mod request;
mod state;
mod ui;

use app::SubsetterApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load();
    log::debug!("Configuration: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Query-Based Column Selector",
        options,
        Box::new(move |_cc| Ok(Box::new(SubsetterApp::new(&config)))),
    )
}
