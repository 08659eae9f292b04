use anyhow::{anyhow, Result};

mod app;

use app::VisualizerApp;

fn main() -> Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([960.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Grid Path Search",
        options,
        Box::new(|cc| Box::new(VisualizerApp::new(cc))),
    )
    .map_err(|e| anyhow!("failed to run the frontend: {e}"))
}
