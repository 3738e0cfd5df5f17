// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! This module handles exporting and importing project data in YAML
//! and JSON formats, and reading configuration files in either format.

use crate::models::project::ProjectData;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Supported structured file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Format implied by the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            other => bail!("Unsupported file extension: {:?}", other),
        }
    }
}

/// Export project data to YAML format.
pub fn export_yaml(data: &ProjectData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Export project data to JSON format.
pub fn export_json(data: &ProjectData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Import project data from YAML format.
pub fn import_yaml(path: &Path) -> Result<ProjectData> {
    read_yaml(path)
}

/// Import project data from JSON format.
pub fn import_json(path: &Path) -> Result<ProjectData> {
    read_json(path)
}

/// Save a project, choosing the format from the extension.
pub fn save_project(data: &ProjectData, path: &Path) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Yaml => export_yaml(data, path),
        FileFormat::Json => export_json(data, path),
    }?;
    log::info!(
        "Saved {} annotations to {}",
        data.annotations.len(),
        path.display()
    );
    Ok(())
}

/// Load a project, choosing the format from the extension.
pub fn load_project(path: &Path) -> Result<ProjectData> {
    let data = match FileFormat::from_path(path)? {
        FileFormat::Yaml => import_yaml(path),
        FileFormat::Json => import_json(path),
    }?;
    log::info!(
        "Loaded {} annotations from {}",
        data.annotations.len(),
        path.display()
    );
    Ok(data)
}

/// Read any deserializable value from a YAML or JSON file.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    match FileFormat::from_path(path)? {
        FileFormat::Yaml => read_yaml(path),
        FileFormat::Json => read_json(path),
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&yaml).with_context(|| format!("Invalid YAML in {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid JSON in {}", path.display()))
}
