//! Hex color parsing and the small amount of color math the compositor needs.
//!
//! Every color that enters the renderer as a string goes through
//! [`HexColor::parse`], which only accepts `#` followed by exactly six hex
//! digits. Anything else is normalized to a fallback before it reaches any
//! arithmetic, so malformed input degrades to black instead of garbage.

use image::Rgba;
use palette::Srgb;

// ============================================================================
// HexColor
// ============================================================================

/// An opaque sRGB color parsed from a strict `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(Srgb<u8>);

impl HexColor {
    /// Pure black, the fallback for malformed input.
    pub const BLACK: Self = Self(Srgb::new(0, 0, 0));

    /// Pure white.
    pub const WHITE: Self = Self(Srgb::new(255, 255, 255));

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    /// Parses `#` followed by exactly six hex digits (either case).
    ///
    /// Shorthand (`#fff`), missing `#`, surrounding whitespace and named
    /// colors are all rejected.
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        hex.parse::<Srgb<u8>>().ok().map(Self)
    }

    /// Parses `hex`, falling back to black.
    pub fn parse_or_black(hex: &str) -> Self {
        Self::parse(hex).unwrap_or(Self::BLACK)
    }

    pub fn red(&self) -> u8 {
        self.0.red
    }

    pub fn green(&self) -> u8 {
        self.0.green
    }

    pub fn blue(&self) -> u8 {
        self.0.blue
    }

    /// Encodes as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }

    /// Perceptual brightness on a 0-255 scale (`0.299 R + 0.587 G + 0.114 B`).
    pub fn luminance(&self) -> f64 {
        let (red, green, blue) = (self.0.red as f64, self.0.green as f64, self.0.blue as f64);
        (red * 299.0 + green * 587.0 + blue * 114.0) / 1000.0
    }

    /// Scales every channel by `1 + percent / 100`, clamped to `0..=255`.
    pub fn scaled(&self, percent: f64) -> Self {
        let factor = 1.0 + percent / 100.0;
        let scale = |c: u8| (c as f64 * factor).clamp(0.0, 255.0).round() as u8;
        Self::new(scale(self.0.red), scale(self.0.green), scale(self.0.blue))
    }

    /// Returns the color as an RGBA pixel with the given alpha.
    pub fn to_rgba(&self, alpha: u8) -> Rgba<u8> {
        Rgba([self.0.red, self.0.green, self.0.blue, alpha])
    }
}

// ============================================================================
// Brightness and Contrast
// ============================================================================

/// Lightens (positive `percent`) or darkens (negative) a `#rrggbb` color.
///
/// Malformed input yields `#000000`.
pub fn adjust_brightness(hex: &str, percent: f64) -> String {
    match HexColor::parse(hex) {
        Some(color) => color.scaled(percent).to_hex(),
        None => HexColor::BLACK.to_hex(),
    }
}

/// Panel tone behind boxed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxTone {
    /// Translucent white panel.
    Light,
    /// Translucent black panel.
    Dark,
}

impl BoxTone {
    /// The solid color of the panel before its alpha is applied.
    pub fn color(&self) -> HexColor {
        match self {
            Self::Light => HexColor::WHITE,
            Self::Dark => HexColor::BLACK,
        }
    }
}

/// Recommends a panel tone that contrasts with the given text color.
///
/// Bright text (luminance above 128) gets a dark panel. Malformed input
/// yields [`BoxTone::Dark`].
pub fn auto_contrast(hex: &str) -> BoxTone {
    match HexColor::parse(hex) {
        Some(color) if color.luminance() <= 128.0 => BoxTone::Light,
        _ => BoxTone::Dark,
    }
}

// ============================================================================
// Swatches
// ============================================================================

/// A named color offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub name: &'static str,
    pub hex: &'static str,
}

const fn swatch(name: &'static str, hex: &'static str) -> Swatch {
    Swatch { name, hex }
}

/// Colors offered for title text.
pub const TEXT_SWATCHES: &[Swatch] = &[
    swatch("White", "#FFFFFF"),
    swatch("Red", "#EF4444"),
    swatch("Orange", "#F97316"),
    swatch("Yellow", "#EAB308"),
    swatch("Green", "#22C55E"),
    swatch("Teal", "#14B8A6"),
    swatch("Blue", "#3B82F6"),
    swatch("Purple", "#8B5CF6"),
    swatch("Beige", "#F5E3C6"),
    swatch("Brown", "#4B3621"),
    swatch("Navy", "#1F3A5F"),
    swatch("Gray", "#6B7280"),
    swatch("Black", "#000000"),
];

/// Colors offered for the outline stroke.
pub const OUTLINE_SWATCHES: &[Swatch] = &[
    swatch("Dark Gray", "#333333"),
    swatch("Black", "#000000"),
    swatch("White", "#FFFFFF"),
];

/// Preset brightness wash strengths.
pub const BRIGHTNESS_PRESETS: &[f32] = &[0.0, 0.1, 0.2];

/// Looks up a swatch by name (case-insensitive) across both palettes.
pub fn find_swatch(name: &str) -> Option<&'static Swatch> {
    TEXT_SWATCHES
        .iter()
        .chain(OUTLINE_SWATCHES)
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}

// ============================================================================
// Tests
// ============================================================================
