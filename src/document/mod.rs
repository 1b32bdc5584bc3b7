//! # Page Model
//!
//! What the layout engine hands over: colors, rectangles with borders, rules,
//! images, glyph runs and pre-rendered vector graphics, all positioned in page
//! coordinates (millipoints, origin top-left).
//!
//! Font rendering happens outside this crate. When a run cannot be printed with
//! a built-in font, the renderer asks a [`GlyphRasterizer`] for a grayscale
//! image of it.

pub mod types;

use image::GrayImage;

use crate::error::Result;

pub use types::{
    BorderSet, BorderSpec, BorderStyle, CollapseMode, Color, GlyphAdjust, GlyphRun, Image,
    PageSpec, Rule, VectorGraphic,
};

/// A text run rendered to pixels.
#[derive(Debug, Clone)]
pub struct RasterizedRun {
    /// Coverage, 0 black ink to 255 paper.
    pub image: GrayImage,
    /// Offset of the image's top-left corner from the baseline origin, in
    /// millipoints.
    pub offset_x: f64,
    pub offset_y: f64,
    /// Extent of the image on the page, in millipoints.
    pub width: f64,
    pub height: f64,
}

/// Renders text the printer has no font for.
pub trait GlyphRasterizer {
    /// Rasterize `run` at `dpi` dots per inch.
    ///
    /// `Ok(None)` means the rasterizer cannot render this run either.
    fn rasterize(&self, run: &GlyphRun, dpi: u32) -> Result<Option<RasterizedRun>>;
}
