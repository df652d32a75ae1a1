//! Extracted raster image types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A deduplicated image saved to the output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Identifier (filename stem)
    pub id: String,

    /// File name within the output directory
    pub filename: String,

    /// Where the bytes were written; callers map this to a locator
    pub storage_path: PathBuf,

    /// Page number (1-indexed)
    pub page: u32,

    /// Image format as a file extension (e.g., "png", "jpeg")
    pub format: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Size of the stored bytes
    pub size_bytes: usize,

    /// Decoded color layout
    pub color_mode: ColorMode,

    /// Image source the asset came from
    pub extraction_method: String,

    /// Hex SHA-256 of the decoded pixels
    pub content_fingerprint: String,
}

impl ImageAsset {
    /// Total pixel count.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// MIME type derived from the format.
    pub fn mime_type(&self) -> &'static str {
        match self.format.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "tif" | "tiff" => "image/tiff",
            "bmp" => "image/bmp",
            "webp" => "image/webp",
            "jp2" | "jpx" => "image/jp2",
            _ => "application/octet-stream",
        }
    }
}

/// Color layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Single luminance channel
    Gray,
    /// Luminance with alpha
    GrayAlpha,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue, alpha
    Rgba,
    /// Anything else the decoder reports
    Other,
}

impl ColorMode {
    /// Number of channels.
    pub fn channels(&self) -> u8 {
        match self {
            ColorMode::Gray => 1,
            ColorMode::GrayAlpha => 2,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
            ColorMode::Other => 0,
        }
    }
}

impl From<image::ColorType> for ColorMode {
    fn from(color: image::ColorType) -> Self {
        use image::ColorType;
        match color {
            ColorType::L8 | ColorType::L16 => ColorMode::Gray,
            ColorType::La8 | ColorType::La16 => ColorMode::GrayAlpha,
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => ColorMode::Rgb,
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => ColorMode::Rgba,
            _ => ColorMode::Other,
        }
    }
}

/// Detect an image format extension from magic bytes.
pub fn detect_format(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpeg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("gif");
    }

    // TIFF: little-endian or big-endian
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Some("tiff");
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Some("bmp");
    }

    // JPEG 2000: 00 00 00 0C 6A 50 20 20
    if data.starts_with(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20]) {
        return Some("jp2");
    }

    None
}
