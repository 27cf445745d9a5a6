//! Line wrapping and vertical placement of the title and subtitle blocks.
//!
//! Everything here is pure: given the same strings, measurements and
//! options, the same lines and coordinates come out. Y coordinates are the
//! vertical centre of a line (text is drawn centre-aligned), not a font
//! baseline.

use crate::color::{BoxTone, auto_contrast};
use crate::fonts::{FontSpec, TextMeasure};
use crate::request::{BoxColorType, TextPosition, TextStyle};
use crate::surface::{CANVAS_WIDTH, RectPx};

/// Horizontal room for a line of text.
pub const MAX_TEXT_WIDTH: f32 = CANVAS_WIDTH as f32 - 160.0;

/// Gap between the title block and a non-empty subtitle block.
pub const BLOCK_SPACING: f32 = 40.0;

/// Padding above and below the text inside a decoration panel.
pub const BOX_PADDING: f32 = 30.0;

/// Distance between the canvas edge and the text block for unboxed text
/// anchored to the top or bottom.
pub const EDGE_INSET: f32 = 150.0;

// ============================================================================
// Wrapping
// ============================================================================

/// Lines produced by [`wrap_text`], with the line height they were wrapped at.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrappedLines {
    pub lines: Vec<String>,
    pub line_height: f32,
}

impl WrappedLines {
    pub fn new(lines: Vec<String>, line_height: f32) -> Self {
        Self { lines, line_height }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total height of the block; zero when there are no lines.
    pub fn block_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

/// Greedily wraps `text` into lines no wider than `max_width`.
///
/// Words are separated by single spaces. A word that alone exceeds
/// `max_width` is kept whole on its own line. Blank text yields no lines.
pub fn wrap_text<M>(text: &str, font: &FontSpec, max_width: f32, measure: &M) -> WrappedLines
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    if text.trim().is_empty() {
        return WrappedLines::new(lines, font.line_height());
    }

    let mut current = String::new();
    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if !current.is_empty() && measure.measure(font, &candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    WrappedLines::new(lines, font.line_height())
}

// ============================================================================
// Vertical Placement
// ============================================================================

/// The translucent rectangle drawn behind boxed text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub rect: RectPx,
    pub tone: BoxTone,
}

/// Where each text block starts and, for boxed text, where the panel sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalLayout {
    /// Centre Y of the first title line.
    pub title_y: f32,
    /// Centre Y of the first subtitle line.
    pub subtitle_y: f32,
    /// Title block height plus, when a subtitle exists, spacing and its block.
    pub text_height: f32,
    /// Present only for [`TextStyle::Box`].
    pub panel: Option<Panel>,
}

/// Places the wrapped blocks on a canvas of `canvas_height`.
///
/// Boxed text always starts `BOX_PADDING` below the panel's top edge; the
/// position option only moves the panel.
pub fn compute_vertical_layout(
    title: &WrappedLines,
    subtitle: &WrappedLines,
    position: TextPosition,
    style: TextStyle,
    box_color: BoxColorType,
    text_color: &str,
    canvas_height: f32,
) -> VerticalLayout {
    let title_block = title.block_height();
    let half_title = title.line_height / 2.0;

    let mut text_height = title_block;
    if !subtitle.is_empty() {
        text_height += BLOCK_SPACING + subtitle.block_height();
    }

    let (title_y, panel) = match style {
        TextStyle::Box => {
            let height = text_height + BOX_PADDING * 2.0;
            let y = match position {
                TextPosition::Top => 0.0,
                TextPosition::Center => (canvas_height - height) / 2.0,
                TextPosition::Bottom => canvas_height - height,
            };
            let tone = match box_color {
                BoxColorType::Auto => auto_contrast(text_color),
                BoxColorType::Light => BoxTone::Light,
                BoxColorType::Dark => BoxTone::Dark,
            };
            let panel = Panel {
                rect: RectPx::new(0.0, y, CANVAS_WIDTH as f32, height),
                tone,
            };
            (y + BOX_PADDING + half_title, Some(panel))
        }
        TextStyle::None | TextStyle::Outline => {
            let y = match position {
                TextPosition::Top => EDGE_INSET + half_title,
                TextPosition::Center => canvas_height / 2.0 - text_height / 2.0 + half_title,
                TextPosition::Bottom => canvas_height - EDGE_INSET - text_height + half_title,
            };
            (y, None)
        }
    };

    let subtitle_y =
        title_y - half_title + title_block + BLOCK_SPACING + subtitle.line_height / 2.0;

    tracing::debug!(
        title_lines = title.len(),
        subtitle_lines = subtitle.len(),
        title_y,
        subtitle_y,
        text_height,
        "computed vertical layout"
    );

    VerticalLayout {
        title_y,
        subtitle_y,
        text_height,
        panel,
    }
}

// ============================================================================
// Tests
// ============================================================================
