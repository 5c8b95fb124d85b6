//! MediaSyncer - Synchronized multi-video comparison viewer
//!
//! Entry point: logging, configuration and the eframe window.

mod app;

use anyhow::Result;
use eframe::egui;
use mediasyncer_core::{config_file_path, ViewerConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::ViewerApp;

fn main() -> Result<()> {
    let config = ViewerConfig::load();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("MediaSyncer starting...");

    // First launch: leave an editable file with the defaults behind
    if config_file_path().is_some_and(|path| !path.exists()) {
        match config.save() {
            Ok(()) => info!("Wrote default config"),
            Err(e) => warn!("Could not write default config: {}", e),
        }
    }
    mediasyncer_media::tools_available();

    // Files given on the command line open in the grid
    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0])
            .with_drag_and_drop(true)
            .with_title("MediaSyncer"),
        ..Default::default()
    };

    eframe::run_native(
        "MediaSyncer",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, config, paths)))),
    )?;

    Ok(())
}
