// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label layout configuration.
//!
//! Every size, gap and threshold used by the layout engine and connector
//! router lives here so the engine can run against synthetic geometry.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Smallest label font size.
    pub font_size_min: f64,
    /// Largest label font size.
    pub font_size_max: f64,
    /// Font size is `image_height / font_size_divisor` before clamping.
    pub font_size_divisor: f64,
    /// Maximum words per wrapped line.
    pub words_per_line: usize,
    /// Estimated glyph advance as a fraction of the font size.
    pub char_width_factor: f64,
    pub line_height_factor: f64,
    /// Horizontal padding inside a label box.
    pub label_padding_x: f64,
    /// Vertical padding inside a label box.
    pub label_padding_y: f64,
    /// Gap between the canvas edge and the outer side of a label box.
    pub edge_padding: f64,
    /// Space between label boxes and the image; the whole margin of a side without labels.
    pub margin_buffer: f64,
    /// Margin above and below the image when any annotation exists.
    pub vertical_margin: f64,
    /// Minimum vertical gap between stacked labels.
    pub min_gap: f64,
    /// Width of the window over which same-side elbows are spread.
    pub elbow_spread: f64,
    /// Vertical distance above which connectors bend with a curve.
    pub curve_threshold: f64,
    /// Horizontal extent of the curved part of a connector.
    pub curve_width: f64,
    /// Images narrower or shorter than this get no layout.
    pub min_image_dimension: f64,
    /// Text shown for labels that have no text yet.
    pub placeholder: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size_min: 18.0,
            font_size_max: 28.0,
            font_size_divisor: 35.0,
            words_per_line: 6,
            char_width_factor: 0.6,
            line_height_factor: 1.25,
            label_padding_x: 8.0,
            label_padding_y: 6.0,
            edge_padding: 12.0,
            margin_buffer: 48.0,
            vertical_margin: 24.0,
            min_gap: 10.0,
            elbow_spread: 80.0,
            curve_threshold: 40.0,
            curve_width: 24.0,
            min_image_dimension: 2.0,
            placeholder: "Add note…".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: LayoutConfig = serde_yaml::from_str("words_per_line: 4\nmin_gap: 2.5\n").unwrap();
        assert_eq!(config.words_per_line, 4);
        assert_eq!(config.min_gap, 2.5);
        assert_eq!(config.elbow_spread, LayoutConfig::default().elbow_spread);
    }
}
