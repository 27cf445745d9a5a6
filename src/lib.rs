//! thumbcraft: square text-over-photo thumbnail renderer
//!
//! This crate composes a 1080×1080 thumbnail from an optional background
//! photo, a brightness wash, and a wrapped title and subtitle that can be
//! plain, outlined, or set on a translucent panel. Renders can be exported
//! as WebP, PNG or JPEG.
//!
//! # Example
//!
//! ```
//! use thumbcraft::{
//!     Compositor, ExportFormat, ExportSize, FontLibrary, RenderRequest, TextPosition,
//!     TextStyle, export,
//! };
//!
//! let mut compositor = Compositor::new(FontLibrary::empty());
//!
//! let request = RenderRequest::new()
//!     .with_title("Summer Reading")
//!     .with_position(TextPosition::Top)
//!     .with_style(TextStyle::Outline)
//!     .with_text_color("#FFFFFF");
//!
//! let canvas = compositor.render(&request);
//! let png = export(canvas, ExportSize::Small, ExportFormat::Png).unwrap();
//! assert!(!png.is_empty());
//! ```
//!
//! # Settings Profiles
//!
//! The scalar settings of a [`RenderRequest`] round-trip through JSON, with
//! missing keys taking their defaults:
//!
//! ```
//! use thumbcraft::{RenderRequest, TextStyle};
//!
//! let request = RenderRequest::from_json(r#"{"textStyle": "outline"}"#).unwrap();
//! assert_eq!(request.text_style, TextStyle::Outline);
//! assert_eq!(request.title, "우리집 도서관");
//! ```
//!
//! # Superseding Renders
//!
//! [`RenderSession`] runs the background decode and font wait as futures and
//! publishes only the newest request's result.

mod color;
mod compositor;
mod error;
mod export;
mod fonts;
mod layer;
mod layout;
mod request;
mod session;
mod surface;

pub use color::{
    BRIGHTNESS_PRESETS, BoxTone, HexColor, OUTLINE_SWATCHES, Swatch, TEXT_SWATCHES,
    adjust_brightness, auto_contrast, find_swatch,
};
pub use compositor::{Compositor, Frame, SUBTITLE_SHADE, paint};
pub use error::{Error, Result};
pub use export::{
    DEFAULT_EXPORT_NAME, EXPORT_BACKDROP, ExportFormat, ExportSize, export, export_file_name,
};
pub use fonts::{FontLibrary, FontSpec, FontStatus, SUBTITLE_FONT, TITLE_FONT, TextMeasure};
pub use layer::{
    BackdropLayer, BackgroundLayer, CoverCrop, FALLBACK_FILL, LayerEffect, LayerPipeline,
    OUTLINE_WIDTH, PANEL_ALPHA, PanelLayer, RenderContext, TextBlock, TextLayer, WashLayer,
    decode_background,
};
pub use layout::{
    BLOCK_SPACING, BOX_PADDING, EDGE_INSET, MAX_TEXT_WIDTH, Panel, VerticalLayout, WrappedLines,
    compute_vertical_layout, wrap_text,
};
pub use request::{
    BoxColorType, DEFAULT_BRIGHTNESS, DEFAULT_OUTLINE_COLOR, DEFAULT_SUBTITLE, DEFAULT_TEXT_COLOR,
    DEFAULT_TITLE, RenderRequest, TextPosition, TextStyle,
};
pub use session::{DEFAULT_FONT_WAIT, RenderOutcome, RenderSession};
pub use surface::{CANVAS_HEIGHT, CANVAS_WIDTH, Canvas, RectPx};
