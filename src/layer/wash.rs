//! White brightness wash over the background.

use super::{LayerEffect, RenderContext};
use crate::color::HexColor;

/// Lightens the whole canvas by compositing white at `alpha = brightness`.
///
/// A brightness of zero (or less) draws nothing. Values above one are
/// treated as one.
#[derive(Debug, Clone, Copy, Default)]
pub struct WashLayer {
    pub brightness: f32,
}

impl WashLayer {
    /// The wash alpha in 8-bit units, or `None` when there is no wash.
    pub fn alpha(&self) -> Option<u8> {
        if self.brightness > 0.0 {
            Some((self.brightness.min(1.0) * 255.0).round() as u8)
        } else {
            None
        }
    }
}

impl LayerEffect for WashLayer {
    fn draw(&self, ctx: &mut RenderContext) {
        if let Some(alpha) = self.alpha() {
            ctx.canvas.wash(HexColor::WHITE.to_rgba(alpha));
        }
    }
}
