//! The render request and its serializable settings.
//!
//! A [`RenderRequest`] carries everything one render needs. Its scalar
//! settings serialize to camelCase JSON so a front end can hand a profile
//! to the renderer; the background pixels never serialize.
//!
//! # Example
//!
//! ```
//! use thumbcraft::{RenderRequest, TextPosition, TextStyle};
//!
//! let request = RenderRequest::new()
//!     .with_title("Summer Reading")
//!     .with_subtitle("")
//!     .with_position(TextPosition::Top)
//!     .with_style(TextStyle::Outline);
//!
//! let json = request.to_json().unwrap();
//! let restored = RenderRequest::from_json(&json).unwrap();
//! assert_eq!(restored.title, "Summer Reading");
//! ```

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_TITLE: &str = "우리집 도서관";
pub const DEFAULT_SUBTITLE: &str = "Reading Together, Growing Together";
pub const DEFAULT_TEXT_COLOR: &str = "#F97316";
pub const DEFAULT_OUTLINE_COLOR: &str = "#333333";
pub const DEFAULT_BRIGHTNESS: f32 = 0.1;

// ============================================================================
// Options
// ============================================================================

/// Vertical anchor of the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TextPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

/// Decoration applied to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TextStyle {
    /// Plain filled text.
    None,
    /// Filled text with a stroked outline.
    Outline,
    /// Filled text on a translucent full-width panel.
    #[default]
    Box,
}

/// Panel tone choice for [`TextStyle::Box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum BoxColorType {
    /// Pick light or dark from the text color's luminance.
    Auto,
    #[default]
    Light,
    Dark,
}

// ============================================================================
// RenderRequest
// ============================================================================

/// All inputs of a single render.
///
/// # JSON Format
///
/// ```json
/// {
///   "title": "우리집 도서관",
///   "subtitle": "Reading Together, Growing Together",
///   "textPosition": "bottom",
///   "textColor": "#F97316",
///   "brightness": 0.1,
///   "textStyle": "box",
///   "outlineColor": "#333333",
///   "boxColorType": "light"
/// }
/// ```
///
/// Missing keys take the defaults shown above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct RenderRequest {
    /// Decoded background pixels. `None` leaves the fallback fill visible.
    #[serde(skip)]
    #[cfg_attr(feature = "jsonschema", schemars(skip))]
    pub background: Option<Arc<RgbaImage>>,

    pub title: String,

    pub subtitle: String,

    pub text_position: TextPosition,

    /// Title color as `#rrggbb`; the subtitle uses a 10% darker shade.
    pub text_color: String,

    /// Strength of the white wash over the background (0.0-1.0).
    pub brightness: f32,

    pub text_style: TextStyle,

    /// Stroke color as `#rrggbb`, used by [`TextStyle::Outline`].
    pub outline_color: String,

    pub box_color_type: BoxColorType,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            background: None,
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            text_position: TextPosition::default(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            brightness: DEFAULT_BRIGHTNESS,
            text_style: TextStyle::default(),
            outline_color: DEFAULT_OUTLINE_COLOR.to_string(),
            box_color_type: BoxColorType::default(),
        }
    }
}

impl RenderRequest {
    /// Creates a request with the default settings and no background.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, background: Option<RgbaImage>) -> Self {
        self.background = background.map(Arc::new);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_position(mut self, position: TextPosition) -> Self {
        self.text_position = position;
        self
    }

    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = color.into();
        self
    }

    pub fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    pub fn with_outline_color(mut self, color: impl Into<String>) -> Self {
        self.outline_color = color.into();
        self
    }

    pub fn with_box_color(mut self, box_color: BoxColorType) -> Self {
        self.box_color_type = box_color;
        self
    }

    /// Serializes the settings to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the settings to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes settings from a JSON string. The background is `None`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
