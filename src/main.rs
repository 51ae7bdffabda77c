mod app;
mod color;
mod state;
mod ui;

use app::TuneStatsApp;
use eframe::egui;
use tune_stats::config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load();
    log::debug!("Config: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tune Stats – Music Analytics Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(TuneStatsApp::new(&config)))),
    )
}
