//! Translucent decoration panel behind boxed text.

use super::{LayerEffect, RenderContext};
use crate::layout::VerticalLayout;

/// Panel opacity: 0.7 in 8-bit units.
pub const PANEL_ALPHA: u8 = 179;

/// Fills the panel from the [`VerticalLayout`] property, if it has one.
///
/// # Consumed Properties
///
/// - [`VerticalLayout`]: supplies the panel rectangle and tone. Without it,
///   or without a panel in it, nothing is drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelLayer;

impl LayerEffect for PanelLayer {
    fn draw(&self, ctx: &mut RenderContext) {
        let Some(panel) = ctx.get::<VerticalLayout>().and_then(|layout| layout.panel) else {
            return;
        };
        ctx.canvas
            .fill_rect(panel.rect, panel.tone.color().to_rgba(PANEL_ALPHA));
    }
}
