// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Read once at startup from the YAML or JSON file named by
//! `MARGINALIA_CONFIG`. Every field has a default, so a config file only
//! needs the values it changes.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::editor::controller::{Capabilities, Controller, InteractionSettings};
use crate::io::serialization::read_file;
use crate::layout::config::LayoutConfig;
use crate::models::store::AnnotationStore;
use crate::render::scene::RenderStyle;

/// Environment variable holding the config file path.
pub const CONFIG_ENV: &str = "MARGINALIA_CONFIG";

/// Editing behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub capabilities: Capabilities,
    pub interaction: InteractionSettings,
    /// Undo steps kept.
    pub history_limit: usize,
    /// Color of newly drawn annotations.
    pub default_color: String,
    /// Colors offered in the toolbar.
    pub palette: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            interaction: InteractionSettings::default(),
            history_limit: 100,
            default_color: "#e53e3e".to_string(),
            palette: ["#e53e3e", "#dd6b20", "#d69e2e", "#38a169", "#3182ce", "#805ad5", "#1a202c"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl EditorConfig {
    pub fn controller(&self) -> Controller {
        Controller::builder()
            .capabilities(self.capabilities)
            .settings(self.interaction)
            .color(self.default_color.clone())
            .build()
    }

    pub fn store(&self) -> AnnotationStore {
        AnnotationStore::new(self.history_limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: LayoutConfig,
    pub editor: EditorConfig,
    pub render: RenderStyle,
}

impl AppConfig {
    /// Read a config file; the format follows the extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        read_file(path)
    }

    /// Config from `MARGINALIA_CONFIG`, or defaults if unset or unreadable.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        let path = Path::new(&path);
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Failed to load configuration: {:#}", e);
                Self::default()
            }
        }
    }
}
