//! Solid fill painted under everything else.

use super::{LayerEffect, RenderContext};
use crate::color::HexColor;

/// Dark orange shown wherever no background covers the canvas.
pub const FALLBACK_FILL: HexColor = HexColor::new(0x7c, 0x2d, 0x12);

/// Overwrites the whole canvas with an opaque color.
#[derive(Debug, Clone, Copy)]
pub struct BackdropLayer {
    pub color: HexColor,
}

impl Default for BackdropLayer {
    fn default() -> Self {
        Self {
            color: FALLBACK_FILL,
        }
    }
}

impl LayerEffect for BackdropLayer {
    fn draw(&self, ctx: &mut RenderContext) {
        ctx.canvas.fill(self.color.to_rgba(255));
    }
}
