//! Draw layers of the thumbnail compositor.
//!
//! A render is a fixed sequence of layers painted onto a fresh [`Canvas`]:
//!
//! ```text
//! Backdrop    fallback fill, always painted
//!     │
//!     ▼
//! Background  cover-cropped photo, if one decoded
//!     │
//!     ▼
//! Wash        white at alpha = brightness
//!     │
//!     ▼
//! Panel       translucent box behind the text (Box style only)
//!     │
//!     ▼
//! Title       ◄── reads VerticalLayout
//!     │
//!     ▼
//! Subtitle    ◄── reads VerticalLayout
//! ```
//!
//! Each layer implements [`LayerEffect`]. Layers talk to each other through
//! typed properties on the [`RenderContext`] rather than through direct
//! references: the compositor places the [`VerticalLayout`] there before
//! drawing, and the background layer emits the [`CoverCrop`] it used.
//!
//! [`VerticalLayout`]: crate::layout::VerticalLayout

pub mod backdrop;
pub mod background;
pub mod panel;
pub mod svg;
pub mod text;
pub mod wash;

pub use backdrop::{BackdropLayer, FALLBACK_FILL};
pub use background::{BackgroundLayer, CoverCrop, decode_background};
pub use panel::{PANEL_ALPHA, PanelLayer};
pub use text::{OUTLINE_WIDTH, TextBlock, TextLayer};
pub use wash::WashLayer;

use crate::surface::Canvas;
use std::any::{Any, TypeId};
use std::collections::HashMap;

// ============================================================================
// Render Context
// ============================================================================

/// Context that flows through the draw layers.
///
/// # Example
///
/// ```ignore
/// // The compositor publishes the layout before drawing
/// ctx.set(layout);
///
/// // A text layer reads it
/// if let Some(layout) = ctx.get::<VerticalLayout>() {
///     // Use the coordinates...
/// }
/// ```
pub struct RenderContext {
    /// The canvas being painted.
    pub canvas: Canvas,

    /// Typed property bag for inter-layer communication.
    properties: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RenderContext {
    /// Creates a new render context around a blank canvas.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            properties: HashMap::new(),
        }
    }

    /// Sets a typed property that downstream layers can read.
    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.properties.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Gets a typed property set upstream.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.properties
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref())
    }

    /// Checks if a property has been set.
    pub fn has<T: Any + Send + Sync>(&self) -> bool {
        self.properties.contains_key(&TypeId::of::<T>())
    }
}

// ============================================================================
// Layer Trait
// ============================================================================

/// A single draw step.
///
/// The separation of [`draw`](Self::draw) and [`emit`](Self::emit) keeps
/// property emission in one canonical place.
pub trait LayerEffect {
    /// Paints onto `ctx.canvas`, reading any upstream properties it needs.
    fn draw(&self, ctx: &mut RenderContext);

    /// Emits properties for downstream layers. Called after
    /// [`draw`](Self::draw); the default emits nothing.
    fn emit(&self, _ctx: &mut RenderContext) {}
}

// ============================================================================
// Layer Pipeline
// ============================================================================

/// The ordered set of layers for one render.
pub struct LayerPipeline<'a> {
    pub backdrop: BackdropLayer,
    pub background: BackgroundLayer<'a>,
    pub wash: WashLayer,
    pub panel: PanelLayer,
    pub title: TextLayer<'a>,
    pub subtitle: TextLayer<'a>,
}

impl LayerPipeline<'_> {
    /// Paints every layer in order onto the context's canvas.
    pub fn render(&self, ctx: &mut RenderContext) {
        let layers: [&dyn LayerEffect; 6] = [
            &self.backdrop,
            &self.background,
            &self.wash,
            &self.panel,
            &self.title,
            &self.subtitle,
        ];

        for layer in layers {
            layer.draw(ctx);
            layer.emit(ctx);
        }
    }
}
