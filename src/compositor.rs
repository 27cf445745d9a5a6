//! Thumbnail compositor: wraps text, places it, and paints every layer.

use std::sync::Arc;

use crate::color::{HexColor, adjust_brightness};
use crate::fonts::{FontLibrary, SUBTITLE_FONT, TITLE_FONT};
use crate::layer::{
    BackdropLayer, BackgroundLayer, CoverCrop, LayerPipeline, PanelLayer, RenderContext,
    TextBlock, TextLayer, WashLayer,
};
use crate::layout::{MAX_TEXT_WIDTH, VerticalLayout, WrappedLines, compute_vertical_layout, wrap_text};
use crate::request::{RenderRequest, TextStyle};
use crate::surface::Canvas;

/// Percent applied to the title color to derive the subtitle color.
pub const SUBTITLE_SHADE: f64 = -10.0;

/// The result of one render: the painted canvas plus the decisions made
/// along the way.
#[derive(Debug, Clone)]
pub struct Frame {
    pub canvas: Canvas,
    pub title: WrappedLines,
    pub subtitle: WrappedLines,
    pub layout: VerticalLayout,
    /// Source region of the background, when one was drawn.
    pub crop: Option<CoverCrop>,
}

/// Main thumbnail rendering engine.
///
/// `Compositor` owns the font library used to measure and draw text and the
/// surface holding the most recent render. Every call to
/// [`render`](Self::render) repaints the surface from scratch, so nothing
/// from a previous request (in particular a previous background) survives.
///
/// # Draw Order
///
/// 1. **Backdrop** - dark orange fill
/// 2. **Background** - photo cropped to cover the square
/// 3. **Wash** - white at alpha = brightness
/// 4. **Panel** - translucent box (Box style only)
/// 5. **Title** - text color
/// 6. **Subtitle** - text color darkened 10%
///
/// # Example
///
/// ```
/// use thumbcraft::{Compositor, FontLibrary, RenderRequest, TextStyle};
///
/// let mut compositor = Compositor::new(FontLibrary::empty());
/// let request = RenderRequest::new().with_style(TextStyle::Outline);
///
/// let canvas = compositor.render(&request);
/// assert_eq!(canvas.width(), 1080);
/// ```
pub struct Compositor {
    fonts: Arc<FontLibrary>,
    surface: Canvas,
}

impl Compositor {
    /// Creates a compositor with the given font library.
    pub fn new(fonts: FontLibrary) -> Self {
        Self::with_shared_fonts(Arc::new(fonts))
    }

    /// Creates a compositor that shares a font library with other owners.
    pub fn with_shared_fonts(fonts: Arc<FontLibrary>) -> Self {
        Self {
            fonts,
            surface: Canvas::new(),
        }
    }

    pub fn fonts(&self) -> &Arc<FontLibrary> {
        &self.fonts
    }

    /// The surface as of the last [`render`](Self::render).
    pub fn surface(&self) -> &Canvas {
        &self.surface
    }

    /// Renders `request` and replaces the held surface with the result.
    pub fn render(&mut self, request: &RenderRequest) -> &Canvas {
        self.surface = paint(&self.fonts, request).canvas;
        &self.surface
    }
}

/// Renders `request` onto a fresh canvas without touching any held surface.
#[tracing::instrument(level = "debug", skip_all, fields(style = ?request.text_style, position = ?request.text_position))]
pub fn paint(fonts: &FontLibrary, request: &RenderRequest) -> Frame {
    let canvas = Canvas::new();
    let canvas_height = canvas.height() as f32;

    let title = wrap_text(&request.title, &TITLE_FONT, MAX_TEXT_WIDTH, fonts);
    let subtitle = wrap_text(&request.subtitle, &SUBTITLE_FONT, MAX_TEXT_WIDTH, fonts);
    let layout = compute_vertical_layout(
        &title,
        &subtitle,
        request.text_position,
        request.text_style,
        request.box_color_type,
        &request.text_color,
        canvas_height,
    );

    let text_color = HexColor::parse_or_black(&request.text_color);
    let subtitle_color = HexColor::parse_or_black(&adjust_brightness(&request.text_color, SUBTITLE_SHADE));
    let outline = match request.text_style {
        TextStyle::Outline => Some(HexColor::parse_or_black(&request.outline_color)),
        TextStyle::None | TextStyle::Box => None,
    };

    let pipeline = LayerPipeline {
        backdrop: BackdropLayer::default(),
        background: BackgroundLayer {
            image: request.background.as_deref(),
        },
        wash: WashLayer {
            brightness: request.brightness,
        },
        panel: PanelLayer,
        title: TextLayer {
            block: TextBlock::Title,
            lines: &title,
            font: TITLE_FONT,
            fill: text_color,
            outline,
            fonts,
        },
        subtitle: TextLayer {
            block: TextBlock::Subtitle,
            lines: &subtitle,
            font: SUBTITLE_FONT,
            fill: subtitle_color,
            outline,
            fonts,
        },
    };

    let mut ctx = RenderContext::new(canvas);
    ctx.set(layout);
    pipeline.render(&mut ctx);
    let crop = ctx.get::<CoverCrop>().copied();

    Frame {
        canvas: ctx.canvas,
        title,
        subtitle,
        layout,
        crop,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BoxTone;
    use crate::fonts::{TextMeasure, host_fonts};
    use crate::layer::FALLBACK_FILL;
    use crate::request::{BoxColorType, TextPosition};
    use image::{Rgba, RgbaImage};

    const ORANGE: [u8; 4] = [0x7c, 0x2d, 0x12, 0xff];

    fn close(actual: Rgba<u8>, expected: [u8; 4]) -> bool {
        actual
            .0
            .iter()
            .zip(expected)
            .all(|(a, e)| (*a as i16 - e as i16).abs() <= 2)
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of pixels that differ
    /// from `background`.
    fn ink_bounds(canvas: &Canvas, background: [u8; 4]) -> Option<(u32, u32, u32, u32)> {
        canvas
            .data
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != background)
            .fold(None, |acc, (x, y, _)| {
                Some(match acc {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                })
            })
    }

    fn count(canvas: &Canvas, color: [u8; 4]) -> usize {
        canvas.data.pixels().filter(|p| p.0 == color).count()
    }

    fn plain(request: RenderRequest) -> RenderRequest {
        request.with_brightness(0.0).with_subtitle("")
    }

    #[test]
    fn fallback_fill_without_background() {
        let mut compositor = Compositor::new(FontLibrary::empty());
        let request = plain(RenderRequest::new()).with_style(TextStyle::None);

        let canvas = compositor.render(&request);
        assert_eq!(canvas.pixel(0, 0).0, ORANGE);
        assert_eq!(canvas.pixel(1079, 1079).0, ORANGE);
        assert_eq!(FALLBACK_FILL.to_rgba(255).0, ORANGE);
    }

    #[test]
    fn bottom_light_box_with_title_only() {
        let request = RenderRequest::new()
            .with_title("우리집 도서관")
            .with_subtitle("")
            .with_position(TextPosition::Bottom)
            .with_style(TextStyle::Box)
            .with_box_color(BoxColorType::Light)
            .with_brightness(0.0);

        let frame = paint(&FontLibrary::empty(), &request);

        assert_eq!(frame.title.len(), 1);
        assert!(frame.subtitle.is_empty());
        assert_eq!(frame.layout.text_height, 90.0);

        let panel = frame.layout.panel.unwrap();
        assert_eq!(panel.tone, BoxTone::Light);
        assert_eq!((panel.rect.y, panel.rect.height), (930.0, 150.0));
        assert_eq!(frame.layout.title_y, 1005.0);

        // Above the panel: untouched fallback fill
        assert_eq!(frame.canvas.pixel(5, 929).0, ORANGE);
        // Inside the panel, left of any text: 70% white over orange
        let inside = frame.canvas.pixel(5, 1000);
        assert!(close(inside, [216, 192, 184, 255]), "got {:?}", inside);
        assert!(close(frame.canvas.pixel(1075, 931), [216, 192, 184, 255]));
    }

    #[test]
    fn wide_background_covers_canvas() {
        let background = RgbaImage::from_fn(2000, 1000, |x, _| {
            if (500..1500).contains(&x) {
                Rgba([0, 0, 255, 255])
            } else {
                Rgba([0, 255, 0, 255])
            }
        });
        let request = plain(RenderRequest::new())
            .with_title("")
            .with_style(TextStyle::None)
            .with_background(Some(background));

        let frame = paint(&FontLibrary::empty(), &request);

        let crop = frame.crop.unwrap();
        assert_eq!((crop.x, crop.y, crop.width, crop.height), (500.0, 0.0, 1000.0, 1000.0));
        for (x, y) in [(0, 0), (1079, 0), (0, 1079), (1079, 1079), (540, 540)] {
            assert_eq!(frame.canvas.pixel(x, y).0, [0, 0, 255, 255], "at ({x}, {y})");
        }
    }

    #[test]
    fn removing_background_leaves_no_trace() {
        let mut compositor = Compositor::new(FontLibrary::empty());
        let with_image = plain(RenderRequest::new())
            .with_style(TextStyle::None)
            .with_background(Some(RgbaImage::from_pixel(64, 64, Rgba([0, 0, 255, 255]))));

        assert_eq!(compositor.render(&with_image).pixel(10, 10).0, [0, 0, 255, 255]);

        let without = with_image.clone().with_background(None);
        let canvas = compositor.render(&without);
        for pixel in canvas.data.pixels() {
            assert_eq!(pixel.0, ORANGE);
        }
    }

    #[test]
    fn brightness_wash_lightens_background() {
        let fonts = FontLibrary::empty();
        let dim = paint(&fonts, &plain(RenderRequest::new()).with_style(TextStyle::None));
        let bright = paint(
            &fonts,
            &plain(RenderRequest::new())
                .with_style(TextStyle::None)
                .with_brightness(0.2),
        );

        let (d, b) = (dim.canvas.pixel(3, 3), bright.canvas.pixel(3, 3));
        assert!(b[0] > d[0] && b[1] > d[1] && b[2] > d[2]);
        assert_eq!(b[3], 255);
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut compositor = Compositor::new(FontLibrary::empty());
        let request = RenderRequest::new()
            .with_position(TextPosition::Center)
            .with_box_color(BoxColorType::Auto)
            .with_background(Some(RgbaImage::from_pixel(30, 90, Rgba([10, 200, 30, 255]))));

        let first = compositor.render(&request).clone();
        let second = compositor.render(&request).clone();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn malformed_colors_do_not_abort() {
        let request = RenderRequest::new()
            .with_text_color("orange")
            .with_outline_color("#12")
            .with_style(TextStyle::Box)
            .with_box_color(BoxColorType::Auto);

        let frame = paint(&FontLibrary::empty(), &request);
        // Malformed text color resolves to a dark panel
        assert_eq!(frame.layout.panel.unwrap().tone, BoxTone::Dark);
    }

    #[test]
    fn dark_box_at_top() {
        let request = plain(RenderRequest::new())
            .with_position(TextPosition::Top)
            .with_box_color(BoxColorType::Dark);

        let frame = paint(&FontLibrary::empty(), &request);
        let panel = frame.layout.panel.unwrap();
        assert_eq!(panel.rect.y, 0.0);

        // 30% of the orange survives under the black panel
        let inside = frame.canvas.pixel(2, 2);
        assert!(close(inside, [37, 13, 5, 255]), "got {:?}", inside);
        assert_eq!(frame.canvas.pixel(2, panel.rect.height as u32 + 1).0, ORANGE);
    }

    #[test]
    fn title_is_drawn_centred_on_its_line() {
        let Some(fonts) = host_fonts() else {
            return;
        };
        let request = plain(RenderRequest::new())
            .with_title("HELLO WORLD")
            .with_style(TextStyle::None)
            .with_position(TextPosition::Center)
            .with_text_color("#FFFFFF");

        let frame = paint(&fonts, &request);
        assert_eq!(frame.title.len(), 1);

        let (min_x, min_y, max_x, max_y) =
            ink_bounds(&frame.canvas, ORANGE).expect("title drew no pixels");
        let centre_x = (min_x + max_x) as f32 / 2.0;
        let centre_y = (min_y + max_y) as f32 / 2.0;
        assert!((centre_x - 540.0).abs() <= 6.0, "centred at x = {centre_x}");
        assert!(
            (centre_y - frame.layout.title_y).abs() <= 12.0,
            "centred at y = {centre_y}, line at {}",
            frame.layout.title_y
        );

        let drawn = (max_x - min_x + 1) as f32;
        let measured = fonts.measure(&TITLE_FONT, "HELLO WORLD");
        assert!((drawn - measured).abs() <= 16.0, "drawn {drawn}, measured {measured}");
        assert!(count(&frame.canvas, [255, 255, 255, 255]) > 1000);
    }

    #[test]
    fn outline_is_stroked_under_the_fill() {
        let Some(fonts) = host_fonts() else {
            return;
        };
        let base = plain(RenderRequest::new())
            .with_title("HELLO")
            .with_position(TextPosition::Center)
            .with_text_color("#FFFFFF")
            .with_outline_color("#000000");

        let filled = paint(&fonts, &base.clone().with_style(TextStyle::None));
        let outlined = paint(&fonts, &base.with_style(TextStyle::Outline));

        const WHITE: [u8; 4] = [255, 255, 255, 255];
        const BLACK: [u8; 4] = [0, 0, 0, 255];
        assert_eq!(count(&filled.canvas, BLACK), 0);
        assert!(count(&outlined.canvas, BLACK) > 500);

        // The stroke sits beneath the fill, so no fill pixels are lost
        let (plain_white, outline_white) = (count(&filled.canvas, WHITE), count(&outlined.canvas, WHITE));
        assert!(outline_white * 10 >= plain_white * 9, "{outline_white} vs {plain_white}");

        // Half the stroke lies outside the glyphs
        let fill = ink_bounds(&filled.canvas, ORANGE).unwrap();
        let stroke = ink_bounds(&outlined.canvas, ORANGE).unwrap();
        assert!(stroke.0 + 2 <= fill.0 && stroke.2 >= fill.2 + 2);
        assert!(stroke.1 + 2 <= fill.1 && stroke.3 >= fill.3 + 2);
    }

    #[test]
    fn subtitle_uses_darker_shade_of_text_color() {
        let Some(fonts) = host_fonts() else {
            return;
        };
        let request = plain(RenderRequest::new())
            .with_title("")
            .with_subtitle("HELLO")
            .with_style(TextStyle::None)
            .with_position(TextPosition::Center)
            .with_text_color("#FFFFFF");

        let frame = paint(&fonts, &request);
        let shade = HexColor::parse(&adjust_brightness("#FFFFFF", SUBTITLE_SHADE)).unwrap();
        assert_eq!(shade.to_hex(), "#e6e6e6");

        assert!(count(&frame.canvas, shade.to_rgba(255).0) > 200);
        assert_eq!(count(&frame.canvas, [255, 255, 255, 255]), 0);

        let (_, min_y, _, max_y) = ink_bounds(&frame.canvas, ORANGE).unwrap();
        let centre_y = (min_y + max_y) as f32 / 2.0;
        assert!((centre_y - frame.layout.subtitle_y).abs() <= 12.0);
    }
}
