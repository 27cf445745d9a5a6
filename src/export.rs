//! Downloadable copies of the rendered thumbnail.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::color::HexColor;
use crate::error::{Error, Result};
use crate::layer::svg::composite_over;
use crate::surface::Canvas;

/// Fill behind the resampled canvas.
pub const EXPORT_BACKDROP: HexColor = HexColor::new(0x1e, 0x29, 0x3b);

/// Base name used when the caller does not supply one.
pub const DEFAULT_EXPORT_NAME: &str = "MyFamilyLibrary";

/// Name used when the supplied base name is empty.
const FALLBACK_EXPORT_NAME: &str = "download";

/// Square output edge length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ExportSize {
    pub const ALL: [ExportSize; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 400,
            Self::Medium => 800,
            Self::Large => 1200,
        }
    }
}

impl TryFrom<u32> for ExportSize {
    type Error = Error;

    fn try_from(pixels: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.pixels() == pixels)
            .ok_or(Error::ExportSize(pixels))
    }
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    #[default]
    WebP,
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Requested encoder quality in `[0, 1]`.
    ///
    /// Only JPEG is lossy here; PNG and WebP ignore it.
    pub fn quality(self) -> f32 {
        match self {
            Self::Jpeg => 0.95,
            Self::WebP | Self::Png => 0.9,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::WebP => "image/webp",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::WebP),
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            _ => Err(Error::ExportFormat(s.to_string())),
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Resamples `canvas` to `size` over the export backdrop and encodes it.
#[tracing::instrument(level = "debug", skip(canvas))]
pub fn export(canvas: &Canvas, size: ExportSize, format: ExportFormat) -> Result<Vec<u8>> {
    let image = resample(canvas, size.pixels());
    let (width, height) = image.dimensions();
    let mut bytes = Vec::new();

    let encoded = match format {
        ExportFormat::Png => PngEncoder::new(&mut bytes).write_image(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::WebP => WebPEncoder::new_lossless(&mut bytes).write_image(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
            let quality = (format.quality() * 100.0).round() as u8;
            JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };
    encoded.map_err(|source| Error::Encode {
        format: format.name(),
        source,
    })?;

    tracing::debug!(bytes = bytes.len(), "export encoded");
    Ok(bytes)
}

fn resample(canvas: &Canvas, edge: u32) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(edge, edge, EXPORT_BACKDROP.to_rgba(255));
    let scaled = if canvas.width() == edge && canvas.height() == edge {
        canvas.data.clone()
    } else {
        imageops::resize(&canvas.data, edge, edge, FilterType::Triangle)
    };
    composite_over(&mut out, &scaled, 0, 0);
    out
}

/// File name for an export of `base` in `format`.
///
/// A trailing image extension on `base` is replaced rather than doubled.
pub fn export_file_name(base: &str, format: ExportFormat) -> String {
    let trimmed = base.trim();
    let stem = [".webp", ".png", ".jpeg", ".jpg"]
        .into_iter()
        .find_map(|ext| {
            let cut = trimmed.len().checked_sub(ext.len())?;
            let tail = trimmed.get(cut..)?;
            tail.eq_ignore_ascii_case(ext).then(|| &trimmed[..cut])
        })
        .unwrap_or(trimmed);

    let stem = if stem.is_empty() { FALLBACK_EXPORT_NAME } else { stem };
    format!("{stem}.{}", format.extension())
}
