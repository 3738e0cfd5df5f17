// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Deterministic label text measurement and wrapping.
//!
//! Label geometry is computed analytically from character counts, so the
//! layout, the renderer and the text-edit overlay all agree on the same
//! boxes without measuring rendered glyphs.

use super::config::LayoutConfig;

/// Character-count based text metrics for one font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMeasure {
    pub font_size: f64,
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasure {
    pub fn new(font_size: f64, config: &LayoutConfig) -> Self {
        Self {
            font_size,
            char_width_factor: config.char_width_factor,
            line_height_factor: config.line_height_factor,
        }
    }

    pub fn line_width(&self, line: &str) -> f64 {
        line.chars().count() as f64 * self.font_size * self.char_width_factor
    }

    pub fn widest(&self, lines: &[String]) -> f64 {
        lines.iter().map(|line| self.line_width(line)).fold(0.0, f64::max)
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * self.line_height_factor
    }

    pub fn block_height(&self, line_count: usize) -> f64 {
        line_count as f64 * self.line_height()
    }
}

/// Label text split into display lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    /// The lines hold the placeholder, not user text.
    pub is_placeholder: bool,
}

/// Group whitespace-separated words into lines of at most `words_per_line`.
/// Explicit line breaks always start a new line; words are never split.
pub fn wrap_words(text: &str, words_per_line: usize) -> Vec<String> {
    let per_line = words_per_line.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        lines.extend(words.chunks(per_line).map(|chunk| chunk.join(" ")));
    }
    lines
}

/// Wrap a label, substituting `placeholder` when it has no visible text.
pub fn wrap_label(text: &str, words_per_line: usize, placeholder: &str) -> WrappedText {
    let lines = wrap_words(text, words_per_line);
    if lines.is_empty() {
        WrappedText {
            lines: vec![placeholder.to_string()],
            is_placeholder: true,
        }
    } else {
        WrappedText {
            lines,
            is_placeholder: false,
        }
    }
}
