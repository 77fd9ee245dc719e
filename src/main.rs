use std::time::Duration;

use clap::Parser;
use eframe::egui;

use penguin_dash::app::DashboardApp;
use penguin_dash::cli::Cli;
use penguin_dash::data::cache::{DatasetCache, DefaultReader};
use penguin_dash::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let cache = DatasetCache::new(DefaultReader {
        timeout: Duration::from_secs(cli.timeout_secs),
    });
    let mut state = AppState::new(cache);
    state.load(&cli.source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let backend = cli.charts.backend();
    eframe::run_native(
        "Mini Data Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state, backend)))),
    )
}
