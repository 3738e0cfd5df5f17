// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Marginalia - image annotation with margin labels
//!
//! A cross-platform desktop application for marking up images with shapes
//! whose labels are laid out automatically in the margins around the image
//! and joined to their shapes by routed connectors.

mod app;
mod config;
mod editor;
mod io;
mod layout;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::MarginaliaApp;
use config::AppConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Marginalia"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Marginalia",
        options,
        Box::new(|_cc| Ok(Box::new(MarginaliaApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
