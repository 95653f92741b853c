mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use app::TrackDashboardApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    // Nothing is shown unless configuration and dataset load cleanly.
    let state = match startup() {
        Ok(state) => state,
        Err(e) => {
            log::error!("Cannot start the dashboard: {e:#}");
            return Err(e);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Track Analytics Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(TrackDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}

fn startup() -> Result<AppState> {
    let config = DashboardConfig::load()?;

    let path = match config.resolve_data_path() {
        Some(path) => path,
        None => pick_dataset().context("no dataset selected")?,
    };

    let dataset = data::loader::load_file(&path, &config.columns)
        .with_context(|| format!("loading dataset {}", path.display()))?;
    log::info!(
        "Loaded {} tracks ({} genres, {} artists) from {}",
        dataset.len(),
        dataset.genres().len(),
        dataset.artists().len(),
        path.display()
    );

    Ok(AppState::new(Arc::new(dataset), &config)?)
}

fn pick_dataset() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open track dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
