// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! A project is the persisted unit of work: the image it annotates, its
//! dimensions, and the annotation list.

use super::annotation::Annotation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete project data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    /// Path or URL of the annotated image.
    pub image: String,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(default)]
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl ProjectData {
    /// Create a new project with the given image and dimensions.
    pub fn new(image: String, image_width: u32, image_height: u32) -> Self {
        let now = Utc::now();
        let title = std::path::Path::new(&image)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            image,
            image_width,
            image_height,
            title,
            created_at: now,
            updated_at: now,
            thumbnail: None,
            annotations: Vec::new(),
        }
    }

    /// Store a new annotation list and bump the update timestamp.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_defaults_to_file_stem() {
        let project = ProjectData::new("/tmp/photos/harbor.png".to_string(), 800, 600);
        assert_eq!(project.title, "harbor");
        assert_eq!(project.created_at, project.updated_at);
        assert!(project.annotations.is_empty());
    }
}
