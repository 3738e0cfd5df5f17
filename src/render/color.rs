// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation color strings.
//!
//! Annotations store their color as free text. Hex forms and a handful of
//! common names are understood; anything else falls back to a caller-supplied
//! color so a bad value never stops rendering.

use std::fmt;

/// 8-bit RGBA color, not premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, dropping alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Black or white, whichever reads better on top of this color.
    pub fn contrasting(self) -> Rgba {
        let luma = 0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b);
        if luma > 160.0 {
            Rgba::BLACK
        } else {
            Rgba::WHITE
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "{}", self.to_hex())
        } else {
            write!(f, "{}{:02x}", self.to_hex(), self.a)
        }
    }
}

const NAMED: &[(&str, Rgba)] = &[
    ("black", Rgba::rgb(0, 0, 0)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("lime", Rgba::rgb(0, 255, 0)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("orange", Rgba::rgb(255, 165, 0)),
    ("purple", Rgba::rgb(128, 0, 128)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("pink", Rgba::rgb(255, 192, 203)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("transparent", Rgba::rgba(0, 0, 0, 0)),
];

/// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or a known color name.
pub fn parse_color(value: &str) -> Option<Rgba> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    NAMED
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, color)| *color)
}

/// Like [`parse_color`], logging and substituting `fallback` on failure.
pub fn parse_color_or(value: &str, fallback: Rgba) -> Rgba {
    parse_color(value).unwrap_or_else(|| {
        log::warn!("Unrecognized color {:?}, using {}", value, fallback);
        fallback
    })
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#e53e3e"), Some(Rgba::rgb(0xe5, 0x3e, 0x3e)));
        assert_eq!(parse_color("#fff"), Some(Rgba::WHITE));
        assert_eq!(parse_color("#00000080"), Some(Rgba::rgba(0, 0, 0, 0x80)));
        assert_eq!(parse_color("  #F0F8  "), Some(Rgba::rgba(255, 0, 255, 136)));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_color("Orange"), Some(Rgba::rgb(255, 165, 0)));
        assert_eq!(parse_color("transparent").map(|c| c.a), Some(0));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gggggg"), None);
        assert_eq!(parse_color("rgb(1,2,3)"), None);
        assert_eq!(parse_color_or("nope", Rgba::BLACK), Rgba::BLACK);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgba::rgb(1, 2, 255).to_string(), "#0102ff");
        assert_eq!(Rgba::rgba(1, 2, 255, 16).to_string(), "#0102ff10");
    }

    #[test]
    fn test_contrasting() {
        assert_eq!(Rgba::rgb(255, 255, 0).contrasting(), Rgba::BLACK);
        assert_eq!(Rgba::rgb(20, 20, 120).contrasting(), Rgba::WHITE);
    }
}
