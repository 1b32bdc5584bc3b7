//! Page content types handed to the renderer.
//!
//! Lengths are millipoints. The simple value types derive
//! `Serialize + Deserialize` so a page model can be built from JSON as well as
//! from Rust.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::protocol::commands::DuplexMode;
use crate::render::bitmap::MonochromeBitmap;

// ============================================================================
// COLOR
// ============================================================================

/// sRGB color. The device prints black only, so colors are reduced to gray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }

    pub fn is_white(&self) -> bool {
        *self == Self::WHITE
    }

    /// Luminance, 0 black to 255 white: `(30·R + 59·G + 11·B) / 100`.
    pub fn luminance(&self) -> u8 {
        let sum = 30 * self.r as u32 + 59 * self.g as u32 + 11 * self.b as u32;
        (sum / 100) as u8
    }

    /// PCL shading percentage, 0 white to 100 black.
    pub fn shade_percent(&self) -> u32 {
        (100.0 - self.luminance() as f64 / 255.0 * 100.0) as u32
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Accepts `"#RRGGBB"`, `[r, g, b]` or `{ "r": .., "g": .., "b": .. }`.
impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorValue {
            Hex(String),
            Triple([u8; 3]),
            Channels { r: u8, g: u8, b: u8 },
        }

        match ColorValue::deserialize(deserializer)? {
            ColorValue::Hex(s) => Color::from_hex(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid color {:?}", s))),
            ColorValue::Triple([r, g, b]) | ColorValue::Channels { r, g, b } => {
                Ok(Color::rgb(r, g, b))
            }
        }
    }
}

// ============================================================================
// BORDERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// How an edge meets its neighbours in a collapsed table grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollapseMode {
    /// Border sits entirely inside the rectangle.
    #[default]
    Separate,
    /// Inner half of a collapsed border.
    CollapseInner,
    /// Outer half of a collapsed border: the edge straddles the rectangle
    /// boundary and extends half its width outside.
    CollapseOuter,
}

/// One border edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderSpec {
    pub width: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_border_style")]
    pub style: BorderStyle,
    #[serde(default)]
    pub collapse: CollapseMode,
}

fn default_border_style() -> BorderStyle {
    BorderStyle::Solid
}

impl BorderSpec {
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            style: BorderStyle::Solid,
            collapse: CollapseMode::Separate,
        }
    }

    pub fn with_style(mut self, style: BorderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_collapse(mut self, collapse: CollapseMode) -> Self {
        self.collapse = collapse;
        self
    }

    /// Whether the edge paints anything.
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.style != BorderStyle::None
    }

    /// Part of the width that lies outside the bordered rectangle.
    pub fn clipped_width(&self) -> f64 {
        match self.collapse {
            CollapseMode::CollapseOuter => self.width / 2.0,
            _ => 0.0,
        }
    }
}

/// Borders of a rectangle in writing-mode terms (before = top, after = bottom,
/// start = left, end = right).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSet {
    pub before: Option<BorderSpec>,
    pub after: Option<BorderSpec>,
    pub start: Option<BorderSpec>,
    pub end: Option<BorderSpec>,
}

impl BorderSet {
    pub fn uniform(spec: BorderSpec) -> Self {
        Self {
            before: Some(spec),
            after: Some(spec),
            start: Some(spec),
            end: Some(spec),
        }
    }

    /// Edges in painting order: before, end, after, start.
    pub fn edges(&self) -> [Option<&BorderSpec>; 4] {
        [
            self.before.as_ref(),
            self.end.as_ref(),
            self.after.as_ref(),
            self.start.as_ref(),
        ]
    }

    /// `true` when no edge paints anything.
    pub fn is_empty(&self) -> bool {
        self.edges()
            .iter()
            .all(|e| e.is_none_or(|spec| !spec.is_visible()))
    }

    /// Visible width of one edge, zero when absent.
    pub fn width_of(spec: Option<&BorderSpec>) -> f64 {
        spec.filter(|s| s.is_visible()).map_or(0.0, |s| s.width)
    }
}

/// A horizontal or vertical rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub start: Point,
    pub end: Point,
    pub width: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_border_style")]
    pub style: BorderStyle,
}

impl Rule {
    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// Area covered by the rule, centred on its line.
    pub fn bounds(&self) -> Rect {
        let half = self.width / 2.0;
        if self.is_horizontal() {
            let x = self.start.x.min(self.end.x);
            Rect::new(
                x,
                self.start.y - half,
                (self.end.x - self.start.x).abs(),
                self.width,
            )
        } else {
            let y = self.start.y.min(self.end.y);
            Rect::new(
                self.start.x - half,
                y,
                self.width,
                (self.end.y - self.start.y).abs(),
            )
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Placement adjustment of one glyph, in millipoints.
///
/// `x_placement`/`y_placement` shift the glyph itself, `x_advance`/`y_advance`
/// change the pen advance after it. Positive y moves up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GlyphAdjust {
    pub x_placement: f64,
    pub y_placement: f64,
    pub x_advance: f64,
    pub y_advance: f64,
}

/// A positioned run of text in one font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GlyphRun {
    /// Resolved font key, e.g. `F1`.
    pub font: String,
    /// Font size in millipoints.
    pub size: f64,
    /// Baseline origin.
    pub origin: Point,
    pub text: String,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub letter_spacing: f64,
    /// Extra advance after each adjustable space.
    #[serde(default)]
    pub word_spacing: f64,
    /// Per-glyph adjustments, indexed by character.
    #[serde(default)]
    pub adjustments: Vec<GlyphAdjust>,
}

impl GlyphRun {
    pub fn new(font: impl Into<String>, size: f64, origin: Point, text: impl Into<String>) -> Self {
        Self {
            font: font.into(),
            size,
            origin,
            text: text.into(),
            color: Color::BLACK,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            adjustments: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

// ============================================================================
// IMAGES AND PAGES
// ============================================================================

/// Image content.
#[derive(Debug, Clone)]
pub enum Image {
    /// Already one bit per pixel; never dithered again.
    Monochrome(MonochromeBitmap),
    /// Any color model; reduced to gray, then to monochrome.
    Raster(DynamicImage),
}

impl Image {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Monochrome(bitmap) => (bitmap.width(), bitmap.height()),
            Self::Raster(img) => (img.width(), img.height()),
        }
    }
}

/// Pre-rendered HP-GL/2 instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorGraphic {
    /// Instruction stream, without the `ESC %#B` / `ESC %#A` wrapper.
    pub instructions: String,
    /// Plotter units per point.
    #[serde(default = "default_vector_scale")]
    pub scale: f64,
}

fn default_vector_scale() -> f64 {
    1.0
}

/// Page attributes read at page start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub paper_source: Option<u16>,
    #[serde(default)]
    pub output_bin: Option<u16>,
    #[serde(default, with = "duplex_serde")]
    pub duplex: Option<DuplexMode>,
}

impl PageSpec {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            paper_source: None,
            output_bin: None,
            duplex: None,
        }
    }

    pub fn with_paper_source(mut self, tray: u16) -> Self {
        self.paper_source = Some(tray);
        self
    }

    pub fn with_duplex(mut self, mode: DuplexMode) -> Self {
        self.duplex = Some(mode);
        self
    }
}

/// Duplex as `"simplex"`, `"long-edge"` or `"short-edge"`.
mod duplex_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::protocol::commands::DuplexMode;

    pub fn serialize<S: Serializer>(mode: &Option<DuplexMode>, s: S) -> Result<S::Ok, S::Error> {
        match mode {
            None => s.serialize_none(),
            Some(DuplexMode::Simplex) => s.serialize_str("simplex"),
            Some(DuplexMode::LongEdge) => s.serialize_str("long-edge"),
            Some(DuplexMode::ShortEdge) => s.serialize_str("short-edge"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DuplexMode>, D::Error> {
        let value: Option<String> = Option::deserialize(d)?;
        match value.as_deref() {
            None => Ok(None),
            Some("simplex") => Ok(Some(DuplexMode::Simplex)),
            Some("long-edge") => Ok(Some(DuplexMode::LongEdge)),
            Some("short-edge") => Ok(Some(DuplexMode::ShortEdge)),
            Some(other) => Err(serde::de::Error::unknown_variant(
                other,
                &["simplex", "long-edge", "short-edge"],
            )),
        }
    }
}
