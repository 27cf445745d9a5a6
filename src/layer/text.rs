//! Title and subtitle text layers.

use super::svg::{composite_over, escape_xml, render_document};
use super::{LayerEffect, RenderContext};
use crate::color::HexColor;
use crate::fonts::{FontLibrary, FontSpec};
use crate::layout::{VerticalLayout, WrappedLines};

/// Stroke width of outlined text, in pixels.
pub const OUTLINE_WIDTH: f32 = 8.0;

/// Which block of the layout a text layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBlock {
    Title,
    Subtitle,
}

/// Draws one wrapped block, each line centred horizontally on the canvas
/// and vertically on its line slot.
///
/// When `outline` is set the stroke is painted first and the fill on top.
///
/// # Consumed Properties
///
/// - [`VerticalLayout`]: supplies the first line's Y for this block. Without
///   it nothing is drawn.
#[derive(Debug, Clone, Copy)]
pub struct TextLayer<'a> {
    pub block: TextBlock,
    pub lines: &'a WrappedLines,
    pub font: FontSpec,
    pub fill: HexColor,
    pub outline: Option<HexColor>,
    pub fonts: &'a FontLibrary,
}

impl TextLayer<'_> {
    fn first_line_y(&self, layout: &VerticalLayout) -> f32 {
        match self.block {
            TextBlock::Title => layout.title_y,
            TextBlock::Subtitle => layout.subtitle_y,
        }
    }

    /// The font's family list, ending with the family the library measured
    /// with so the rasterizer draws with that same face.
    fn family_list(&self) -> String {
        let mut list = self.font.svg_family();
        if let Some(family) = self.fonts.resolved_family(&self.font) {
            if !self.font.families.iter().any(|f| f.eq_ignore_ascii_case(&family)) {
                list.push_str(&format!(", '{family}'"));
            }
        }
        list
    }

    /// Builds the SVG document that draws this block on a `width` x `height`
    /// canvas, starting at `first_y`.
    pub fn document(&self, first_y: f32, width: u32, height: u32) -> String {
        let stroke = match self.outline {
            Some(color) => format!(
                r#" stroke="{}" stroke-width="{}" stroke-linejoin="round" paint-order="stroke""#,
                color.to_hex(),
                OUTLINE_WIDTH
            ),
            None => String::new(),
        };

        let center_x = width as f32 / 2.0;
        let mut body = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            let y = first_y + index as f32 * self.lines.line_height;
            body.push_str(&format!(
                r#"<text x="{center_x}" y="{y}" xml:space="preserve">{}</text>"#,
                escape_xml(line)
            ));
        }

        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                r#"<g font-family="{family}" font-weight="{weight}" font-size="{size}" "#,
                r#"text-anchor="middle" dominant-baseline="central" fill="{fill}"{stroke}>"#,
                "{body}</g></svg>"
            ),
            w = width,
            h = height,
            family = escape_xml(&self.family_list()),
            weight = self.font.weight,
            size = self.font.size,
            fill = self.fill.to_hex(),
            stroke = stroke,
            body = body,
        )
    }
}

impl LayerEffect for TextLayer<'_> {
    fn draw(&self, ctx: &mut RenderContext) {
        if self.lines.is_empty() {
            return;
        }
        let Some(first_y) = ctx.get::<VerticalLayout>().map(|l| self.first_line_y(l)) else {
            return;
        };

        let (width, height) = (ctx.canvas.width(), ctx.canvas.height());
        let svg = self.document(first_y, width, height);
        if let Some(text) = render_document(&svg, width, height, self.fonts.database()) {
            composite_over(&mut ctx.canvas.data, &text, 0, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{SUBTITLE_FONT, TITLE_FONT, host_fonts};
    use crate::surface::Canvas;
    use image::Rgba;

    fn wrapped(lines: &[&str], line_height: f32) -> WrappedLines {
        WrappedLines::new(lines.iter().map(|s| s.to_string()).collect(), line_height)
    }

    #[test]
    fn document_places_each_line() {
        let fonts = FontLibrary::empty();
        let lines = wrapped(&["first", "second"], 90.0);
        let layer = TextLayer {
            block: TextBlock::Title,
            lines: &lines,
            font: TITLE_FONT,
            fill: HexColor::new(0xf9, 0x73, 0x16),
            outline: None,
            fonts: &fonts,
        };

        let svg = layer.document(195.0, 1080, 1080);
        assert!(svg.contains(r#"<text x="540" y="195" xml:space="preserve">first</text>"#));
        assert!(svg.contains(r#"<text x="540" y="285" xml:space="preserve">second</text>"#));
        assert!(svg.contains(r##"fill="#f97316""##));
        assert!(svg.contains(r#"font-weight="700""#));
        assert!(svg.contains("&apos;Pretendard&apos;"));
        assert!(!svg.contains("stroke="));
    }

    #[test]
    fn outline_strokes_before_fill() {
        let fonts = FontLibrary::empty();
        let lines = wrapped(&["a & b"], 68.0);
        let layer = TextLayer {
            block: TextBlock::Subtitle,
            lines: &lines,
            font: SUBTITLE_FONT,
            fill: HexColor::WHITE,
            outline: Some(HexColor::new(0x33, 0x33, 0x33)),
            fonts: &fonts,
        };

        let svg = layer.document(100.0, 1080, 1080);
        assert!(svg.contains(r##"stroke="#333333" stroke-width="8" stroke-linejoin="round" paint-order="stroke""##));
        assert!(svg.contains(">a &amp; b</text>"));
    }

    #[test]
    fn generated_document_parses() {
        let fonts = FontLibrary::empty();
        let lines = wrapped(&["<quoted> \"title\""], 90.0);
        let layer = TextLayer {
            block: TextBlock::Title,
            lines: &lines,
            font: TITLE_FONT,
            fill: HexColor::BLACK,
            outline: Some(HexColor::WHITE),
            fonts: &fonts,
        };

        let svg = layer.document(540.0, 64, 64);
        assert!(render_document(&svg, 64, 64, fonts.database()).is_some());
    }

    #[test]
    fn empty_block_leaves_canvas_untouched() {
        let fonts = FontLibrary::empty();
        let lines = WrappedLines::new(Vec::new(), 68.0);
        let layer = TextLayer {
            block: TextBlock::Subtitle,
            lines: &lines,
            font: SUBTITLE_FONT,
            fill: HexColor::WHITE,
            outline: None,
            fonts: &fonts,
        };

        let mut ctx = RenderContext::new(Canvas::with_size(8, 8));
        ctx.canvas.fill(Rgba([4, 5, 6, 255]));
        layer.draw(&mut ctx);

        assert_eq!(ctx.canvas.pixel(4, 4).0, [4, 5, 6, 255]);
    }

    #[test]
    fn family_list_ends_with_measured_face() {
        let Some(fonts) = host_fonts() else {
            return;
        };
        let lines = wrapped(&["HELLO"], 90.0);
        let layer = TextLayer {
            block: TextBlock::Title,
            lines: &lines,
            font: TITLE_FONT,
            fill: HexColor::WHITE,
            outline: None,
            fonts: &fonts,
        };

        let family = fonts.resolved_family(&TITLE_FONT).unwrap();
        let svg = layer.document(100.0, 1080, 1080);
        assert!(svg.contains(&escape_xml(&family)), "{family} missing from {svg}");
    }

    #[test]
    fn host_face_draws_glyphs() {
        let Some(fonts) = host_fonts() else {
            return;
        };
        let lines = wrapped(&["HELLO"], 68.0);
        let layer = TextLayer {
            block: TextBlock::Subtitle,
            lines: &lines,
            font: SUBTITLE_FONT,
            fill: HexColor::WHITE,
            outline: None,
            fonts: &fonts,
        };

        let mut ctx = RenderContext::new(Canvas::with_size(400, 200));
        ctx.canvas.fill(Rgba([0, 0, 0, 255]));
        ctx.set(VerticalLayout {
            title_y: 0.0,
            subtitle_y: 100.0,
            text_height: 68.0,
            panel: None,
        });
        layer.draw(&mut ctx);

        let inked = ctx.canvas.data.pixels().filter(|p| p[0] > 128).count();
        assert!(inked > 200, "only {inked} pixels drawn");
        assert_eq!(ctx.canvas.pixel(200, 5).0, [0, 0, 0, 255]);
    }
}
