mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::SheetViewerApp;
use data::loader::SheetLoader;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Google Sheet Data Viewer",
        options,
        Box::new(|_cc| {
            let loader = SheetLoader::http()?;
            Ok(Box::new(SheetViewerApp::new(loader)))
        }),
    )
}
