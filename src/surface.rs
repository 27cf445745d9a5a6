//! The square raster target and the rectangles drawn onto it.

use image::{Rgba, RgbaImage};

use crate::layer::svg::alpha_blend;

/// Width of the canvas in pixels.
pub const CANVAS_WIDTH: u32 = 1080;

/// Height of the canvas in pixels.
pub const CANVAS_HEIGHT: u32 = 1080;

/// A rectangle in canvas coordinates.
///
/// Coordinates are fractional because layout math works in `f32`; they are
/// rounded to whole pixels only when filled. The rectangle may extend past
/// the canvas (a tall panel anchored to the bottom starts above `y = 0`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectPx {
    /// X offset from the left edge of the canvas
    pub x: f32,
    /// Y offset from the top edge of the canvas
    pub y: f32,
    /// Width of the rectangle
    pub width: f32,
    /// Height of the rectangle
    pub height: f32,
}

impl RectPx {
    /// Creates a new rectangle with the given position and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whole-pixel span `(x0, y0, x1, y1)` clipped to a `width` x `height` raster.
    fn pixel_span(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let clip = |v: f32, max: u32| v.round().clamp(0.0, max as f32) as u32;
        (
            clip(self.x, width),
            clip(self.y, height),
            clip(self.right(), width),
            clip(self.bottom(), height),
        )
    }
}

/// The fixed-size square raster every render repaints.
///
/// Pixels are straight (non-premultiplied) RGBA. A fresh canvas is fully
/// transparent; the first draw layer paints it opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    /// The image data in RGBA format.
    pub data: RgbaImage,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Creates a transparent 1080x1080 canvas.
    pub fn new() -> Self {
        Self::with_size(CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Creates a transparent canvas of arbitrary size.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            data: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// Returns the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.data.get_pixel(x, y)
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.data.as_raw()
    }

    /// Overwrites every pixel with `color`.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.data.pixels_mut() {
            *pixel = color;
        }
    }

    /// Composites `color` (with its alpha) over the whole canvas.
    pub fn wash(&mut self, color: Rgba<u8>) {
        let rect = RectPx::new(0.0, 0.0, self.width() as f32, self.height() as f32);
        self.fill_rect(rect, color);
    }

    /// Composites `color` (with its alpha) over the part of `rect` that lies
    /// on the canvas.
    pub fn fill_rect(&mut self, rect: RectPx, color: Rgba<u8>) {
        let (x0, y0, x1, y1) = rect.pixel_span(self.width(), self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let dst = self.data.get_pixel_mut(x, y);
                *dst = alpha_blend(color, *dst);
            }
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_px_edges() {
        let rect = RectPx::new(10.0, 20.0, 100.0, 200.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 220.0);
    }

    #[test]
    fn new_canvas_is_square_and_transparent() {
        let canvas = Canvas::new();
        assert_eq!((canvas.width(), canvas.height()), (1080, 1080));
        assert_eq!(canvas.pixel(540, 540).0, [0, 0, 0, 0]);
    }

    #[test]
    fn fill_rect_clips_to_canvas() {
        let mut canvas = Canvas::with_size(10, 10);
        canvas.fill(Rgba([255, 0, 0, 255]));
        canvas.fill_rect(RectPx::new(-5.0, 6.0, 50.0, 50.0), Rgba([0, 0, 255, 255]));

        assert_eq!(canvas.pixel(0, 5).0, [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(0, 6).0, [0, 0, 255, 255]);
        assert_eq!(canvas.pixel(9, 9).0, [0, 0, 255, 255]);
    }

    #[test]
    fn wash_blends_translucent_color() {
        let mut canvas = Canvas::with_size(4, 4);
        canvas.fill(Rgba([0, 0, 0, 255]));
        canvas.wash(Rgba([255, 255, 255, 128]));

        let pixel = canvas.pixel(2, 2);
        assert_eq!(pixel[3], 255);
        assert!((126..=130).contains(&pixel[0]), "got {:?}", pixel);
    }
}
