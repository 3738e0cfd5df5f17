// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading.
//!
//! Decodes an image into RGBA pixels for display and keeps the original
//! encoded bytes so exports can embed the image unchanged.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::io::Cursor;
use std::path::Path;

/// A decoded image plus its source encoding.
#[derive(Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major.
    pub pixels: Vec<u8>,
    /// File contents as read from disk.
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl LoadedImage {
    /// `data:` URI of the original bytes, for self-contained exports.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}

/// Load and decode an image file.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode_image(bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

/// Decode encoded image bytes.
pub fn decode_image(bytes: Vec<u8>) -> Result<LoadedImage> {
    let format = image::guess_format(&bytes).context("Unrecognized image format")?;
    let decoded = image::load_from_memory_with_format(&bytes, format)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: decoded.into_raw(),
        bytes,
        mime_type: format.to_mime_type(),
    })
}

/// PNG thumbnail no larger than `max_side` on either axis, as a data URI.
pub fn thumbnail_data_uri(loaded: &LoadedImage, max_side: u32) -> Result<String> {
    let buffer = image::RgbaImage::from_raw(loaded.width, loaded.height, loaded.pixels.clone())
        .context("Pixel buffer does not match image size")?;
    let small = image::DynamicImage::ImageRgba8(buffer).thumbnail(max_side, max_side);
    let mut bytes = Vec::new();
    small.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        BASE64_STANDARD.encode(&bytes)
    ))
}
