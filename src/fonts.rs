//! Font specifications, text measurement and font readiness.
//!
//! Line wrapping must measure text with the same faces that will later draw
//! it. [`FontLibrary`] owns the font database shared by both sides: it
//! answers width queries through [`TextMeasure`] (glyph advances read with
//! ttf-parser) and hands the same database to usvg when text is rasterized.
//!
//! Measurement resolves faces the way usvg does: the requested families,
//! then `serif`, and per character the same fallback walk over the
//! database. Kerning and shaping are not applied, so measured widths can
//! differ from drawn ones by a few pixels.

use std::path::Path;
use std::sync::Arc;

use resvg::usvg::fontdb::{
    self, Database, FaceInfo, Family, Language, Query, Stretch, Style, Weight,
};
use ttf_parser::{Face, GlyphId};

use crate::error::Result;

// ============================================================================
// FontSpec
// ============================================================================

/// A font request: an ordered family list, a weight and a pixel size.
///
/// The size doubles as the line height of a wrapped block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Families in preference order. Generic names (`sans-serif`, `serif`,
    /// `monospace`) map to the host's defaults.
    pub families: &'static [&'static str],
    /// CSS weight (400 regular, 700 bold).
    pub weight: u16,
    /// Font size in pixels.
    pub size: f32,
}

/// Title text: `bold 90px "Pretendard", "Noto Sans KR", sans-serif`.
pub const TITLE_FONT: FontSpec = FontSpec {
    families: &["Pretendard", "Noto Sans KR", "sans-serif"],
    weight: 700,
    size: 90.0,
};

/// Subtitle text: `500 68px "Caveat", "Pretendard", "Noto Sans KR", sans-serif`.
pub const SUBTITLE_FONT: FontSpec = FontSpec {
    families: &["Caveat", "Pretendard", "Noto Sans KR", "sans-serif"],
    weight: 500,
    size: 68.0,
};

fn is_generic(family: &str) -> bool {
    matches!(family, "sans-serif" | "serif" | "monospace")
}

impl FontSpec {
    /// Line height of one wrapped line.
    pub fn line_height(&self) -> f32 {
        self.size
    }

    /// The first non-generic family, i.e. the face the design asks for.
    pub fn primary_family(&self) -> Option<&'static str> {
        self.families.iter().copied().find(|f| !is_generic(f))
    }

    /// CSS shorthand, e.g. `bold 90px "Pretendard", sans-serif`.
    pub fn css(&self) -> String {
        let weight = match self.weight {
            700 => "bold".to_string(),
            400 => "normal".to_string(),
            w => w.to_string(),
        };
        format!("{weight} {}px {}", self.size, self.family_list('"'))
    }

    /// Family list for an SVG `font-family` attribute (single-quoted names).
    pub fn svg_family(&self) -> String {
        self.family_list('\'')
    }

    fn family_list(&self, quote: char) -> String {
        self.families
            .iter()
            .map(|f| {
                if is_generic(f) {
                    f.to_string()
                } else {
                    format!("{quote}{f}{quote}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn query_families(&self) -> Vec<Family<'static>> {
        self.families
            .iter()
            .map(|f| match *f {
                "sans-serif" => Family::SansSerif,
                "serif" => Family::Serif,
                "monospace" => Family::Monospace,
                name => Family::Name(name),
            })
            .collect()
    }
}

// ============================================================================
// TextMeasure
// ============================================================================

/// Measures the advance width of a run of text.
pub trait TextMeasure {
    /// Returns the pixel width of `text` drawn with `font`.
    fn measure(&self, font: &FontSpec, text: &str) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(&self, font: &FontSpec, text: &str) -> f32 {
        (**self).measure(font, text)
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for Arc<T> {
    fn measure(&self, font: &FontSpec, text: &str) -> f32 {
        (**self).measure(font, text)
    }
}

// ============================================================================
// FontLibrary
// ============================================================================

/// Outcome of asking whether a font is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontStatus {
    /// The primary family resolved.
    Ready,
    /// Another face will stand in for the primary family.
    Substituted { family: String },
    /// No face at all can draw this font.
    Missing,
}

/// A shared font database used for both measuring and drawing text.
#[derive(Debug, Clone)]
pub struct FontLibrary {
    db: Arc<Database>,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontLibrary {
    /// A library with no faces. Text measures with a size-based estimate
    /// and draws nothing.
    pub fn empty() -> Self {
        Self::from_database(Database::new())
    }

    /// A library holding the host's installed fonts.
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self::from_database(db)
    }

    /// Wraps `db`. If its `sans-serif` mapping names a family it does not
    /// hold, the mapping is pointed at an installed face.
    pub fn from_database(mut db: Database) -> Self {
        adopt_sans_serif(&mut db);
        Self { db: Arc::new(db) }
    }

    /// Adds a font file (TTF/OTF/TTC) to the library.
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let db = Arc::make_mut(&mut self.db);
        db.load_font_file(path)?;
        adopt_sans_serif(db);
        Ok(())
    }

    /// Adds in-memory font data to the library.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        let db = Arc::make_mut(&mut self.db);
        db.load_font_data(data);
        adopt_sans_serif(db);
    }

    /// Number of faces in the library.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// The database handed to usvg for text rasterization.
    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    /// Family of the face that measures and draws `font`, if any can.
    ///
    /// Text layers append it to their `font-family` list so the rasterizer
    /// lands on the same face the wrapper measured with.
    pub fn resolved_family(&self, font: &FontSpec) -> Option<String> {
        let id = self.resolve(font)?;
        self.db.face(id).and_then(family_name)
    }

    /// Checks whether `font` can be drawn with its primary family.
    pub fn ensure_ready(&self, font: &FontSpec) -> FontStatus {
        let Some(face) = self.resolve(font).and_then(|id| self.db.face(id)) else {
            return FontStatus::Missing;
        };

        let wanted = font.primary_family().unwrap_or_default();
        let matches = face
            .families
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(wanted));
        if matches {
            FontStatus::Ready
        } else {
            let family = family_name(face).unwrap_or_else(|| face.post_script_name.clone());
            FontStatus::Substituted { family }
        }
    }

    /// Picks the face used for `font`: the requested families, then the
    /// generic serif the rasterizer always tries last, then the family of
    /// any installed face.
    fn resolve(&self, font: &FontSpec) -> Option<fontdb::ID> {
        let mut families = font.query_families();
        families.push(Family::Serif);
        let query = Query {
            families: &families,
            weight: Weight(font.weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };

        self.db.query(&query).or_else(|| {
            let name = self.db.faces().find_map(family_name)?;
            self.db.query(&Query {
                families: &[Family::Name(&name)],
                ..query
            })
        })
    }

    /// Sums advances from `primary`, taking characters it lacks from the
    /// faces the rasterizer falls back to.
    ///
    /// Fallback follows usvg: for the first unresolved character, pick the
    /// first unused face sharing the primary's style, weight or stretch
    /// that has it; that face then covers every pending character it can.
    /// Once a character has no fallback, it and everything still pending
    /// measure as `.notdef`.
    fn measure_with_fallback(&self, primary: fontdb::ID, text: &str, size: f32) -> Option<f32> {
        let (mut width, notdef, mut missing) = self.with_face(primary, |face| {
            let mut width = 0.0;
            let mut missing = Vec::new();
            for c in text.chars() {
                match face.glyph_index(c) {
                    Some(glyph) => width += scaled_advance(face, glyph, size),
                    None => missing.push(c),
                }
            }
            (width, scaled_advance(face, GlyphId(0), size), missing)
        })?;

        let base = self.db.face(primary)?;
        let mut used = vec![primary];
        while let Some(&c) = missing.first() {
            let fallback = self.db.faces().find(|face| {
                !used.contains(&face.id)
                    && (face.style == base.style
                        || face.weight == base.weight
                        || face.stretch == base.stretch)
                    && self.has_char(face.id, c)
            });
            let Some(fallback) = fallback else {
                break;
            };
            used.push(fallback.id);

            width += self
                .with_face(fallback.id, |face| {
                    let mut found = 0.0;
                    missing.retain(|&m| match face.glyph_index(m) {
                        Some(glyph) => {
                            found += scaled_advance(face, glyph, size);
                            false
                        }
                        None => true,
                    });
                    found
                })
                .unwrap_or(0.0);
        }

        Some(width + missing.len() as f32 * notdef)
    }

    fn with_face<T>(&self, id: fontdb::ID, f: impl FnOnce(&Face<'_>) -> T) -> Option<T> {
        self.db
            .with_face_data(id, |data, index| Face::parse(data, index).ok().map(|face| f(&face)))
            .flatten()
    }

    fn has_char(&self, id: fontdb::ID, c: char) -> bool {
        self.with_face(id, |face| face.glyph_index(c).is_some())
            .unwrap_or(false)
    }
}

impl TextMeasure for FontLibrary {
    fn measure(&self, font: &FontSpec, text: &str) -> f32 {
        self.resolve(font)
            .and_then(|id| self.measure_with_fallback(id, text, font.size))
            .unwrap_or_else(|| estimate_width(text, font.size))
    }
}

/// The face's English family name, else its first one.
fn family_name(face: &FaceInfo) -> Option<String> {
    face.families
        .iter()
        .find(|(_, lang)| *lang == Language::English_UnitedStates)
        .or_else(|| face.families.first())
        .map(|(name, _)| name.clone())
}

/// fontdb maps `sans-serif` to Arial, which many hosts lack. Point it at
/// an installed proportional sans face, or any proportional face.
fn adopt_sans_serif(db: &mut Database) {
    let mapped = db.family_name(&Family::SansSerif).to_string();
    let families = [Family::Name(&mapped)];
    let present = db.query(&Query {
        families: &families,
        ..Query::default()
    });
    if present.is_some() {
        return;
    }

    let candidate = db
        .faces()
        .filter(|face| !face.monospaced)
        .find(|face| face.families.iter().any(|(name, _)| name.contains("Sans")))
        .or_else(|| db.faces().find(|face| !face.monospaced))
        .and_then(family_name);
    if let Some(name) = candidate {
        tracing::debug!(from = %mapped, to = %name, "remapped sans-serif");
        db.set_sans_serif_family(name);
    }
}

fn scaled_advance(face: &Face<'_>, glyph: GlyphId, size: f32) -> f32 {
    face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * size / face.units_per_em() as f32
}

/// Width estimate when no face is available: full-width for CJK and
/// Hangul, narrower for everything else.
fn estimate_width(text: &str, size: f32) -> f32 {
    let ems: f32 = text
        .chars()
        .map(|c| match c {
            ' ' => 0.3,
            c if (c as u32) >= 0x1100 => 1.0,
            _ => 0.55,
        })
        .sum();
    ems * size
}

/// The host's installed fonts, when any face can draw the title. Tests that
/// rasterize glyphs return early without them.
#[cfg(test)]
pub(crate) fn host_fonts() -> Option<FontLibrary> {
    use std::sync::OnceLock;

    static HOST: OnceLock<Option<FontLibrary>> = OnceLock::new();
    HOST.get_or_init(|| {
        let fonts = FontLibrary::system();
        (fonts.ensure_ready(&TITLE_FONT) != FontStatus::Missing).then_some(fonts)
    })
    .clone()
}

// ============================================================================
// Tests
// ============================================================================
