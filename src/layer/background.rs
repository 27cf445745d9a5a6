//! Background photo, centre-cropped to cover the canvas.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use super::svg::composite_over;
use super::{LayerEffect, RenderContext};

// ============================================================================
// CoverCrop
// ============================================================================

/// The source region of the background that gets scaled onto the canvas.
///
/// The region always has the canvas's aspect ratio and is centred on the
/// image, so the scaled result fills the canvas with no letterboxing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverCrop {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CoverCrop {
    /// Computes the crop for an image on a canvas. Returns `None` when
    /// either has a zero dimension.
    pub fn fit(image_width: u32, image_height: u32, canvas_width: u32, canvas_height: u32) -> Option<Self> {
        if image_width == 0 || image_height == 0 || canvas_width == 0 || canvas_height == 0 {
            return None;
        }

        let (iw, ih) = (image_width as f32, image_height as f32);
        let canvas_aspect = canvas_width as f32 / canvas_height as f32;

        let crop = if iw / ih > canvas_aspect {
            // Wider than the canvas: keep full height, trim the sides
            let width = ih * canvas_aspect;
            Self {
                x: (iw - width) / 2.0,
                y: 0.0,
                width,
                height: ih,
            }
        } else {
            // Taller (or same aspect): keep full width, trim top and bottom
            let height = iw / canvas_aspect;
            Self {
                x: 0.0,
                y: (ih - height) / 2.0,
                width: iw,
                height,
            }
        };
        Some(crop)
    }

    /// Whole-pixel region `(x, y, width, height)` inside a `w` x `h` image.
    fn pixel_region(&self, w: u32, h: u32) -> (u32, u32, u32, u32) {
        let x = (self.x.round() as u32).min(w - 1);
        let y = (self.y.round() as u32).min(h - 1);
        let width = (self.width.round() as u32).clamp(1, w - x);
        let height = (self.height.round() as u32).clamp(1, h - y);
        (x, y, width, height)
    }
}

// ============================================================================
// BackgroundLayer
// ============================================================================

/// Draws the background image, if any, scaled to cover the canvas.
///
/// # Emitted Properties
///
/// - [`CoverCrop`]: the source region used, when an image was drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundLayer<'a> {
    pub image: Option<&'a RgbaImage>,
}

impl BackgroundLayer<'_> {
    fn crop(&self, ctx: &RenderContext) -> Option<CoverCrop> {
        let image = self.image?;
        CoverCrop::fit(
            image.width(),
            image.height(),
            ctx.canvas.width(),
            ctx.canvas.height(),
        )
    }
}

impl LayerEffect for BackgroundLayer<'_> {
    fn draw(&self, ctx: &mut RenderContext) {
        let (Some(image), Some(crop)) = (self.image, self.crop(ctx)) else {
            return;
        };

        let (x, y, width, height) = crop.pixel_region(image.width(), image.height());
        let region = imageops::crop_imm(image, x, y, width, height).to_image();
        let scaled = imageops::resize(
            &region,
            ctx.canvas.width(),
            ctx.canvas.height(),
            FilterType::Triangle,
        );

        composite_over(&mut ctx.canvas.data, &scaled, 0, 0);
    }

    fn emit(&self, ctx: &mut RenderContext) {
        if let Some(crop) = self.crop(ctx) {
            ctx.set(crop);
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes background file bytes (PNG, JPEG, WebP, ...) into RGBA pixels.
///
/// Undecodable or empty images yield `None`; the render then shows the
/// fallback fill instead of failing.
pub fn decode_background(bytes: &[u8]) -> Option<RgbaImage> {
    match image::load_from_memory(bytes) {
        Ok(decoded) if decoded.width() > 0 && decoded.height() > 0 => Some(decoded.to_rgba8()),
        Ok(_) => {
            tracing::warn!("background image is empty; rendering without it");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "background image failed to decode; rendering without it");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
