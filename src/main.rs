#![warn(clippy::all, rust_2018_idioms)]

use formula_canvas::{CanvasConfig, FormulaApp};

fn main() -> eframe::Result {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = CanvasConfig::from_env();
    log::info!("formula_canvas v{} starting", env!("CARGO_PKG_VERSION"));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Formula Canvas"),
        ..Default::default()
    };

    eframe::run_native(
        "formula_canvas",
        native_options,
        Box::new(|cc| Ok(Box::new(FormulaApp::new(cc, config)))),
    )
}
