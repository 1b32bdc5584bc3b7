//! # Text Emission
//!
//! A run prints with a built-in font when its font key is in the table and
//! every character is in ISO 8859-1. Glyph adjustments become relative cursor
//! moves between characters:
//!
//! ```text
//! ESC*v1O  ESC(0N ESC(s1p12v0s0b16602T  ESC*v0T  ESC*v0O  ESC&a720h1440V
//! H e l l ESC&a+2H o
//! ```
//!
//! Everything else is rendered to pixels by the [`GlyphRasterizer`] and sent
//! as a bitmap.
//!
//! [`GlyphRasterizer`]: crate::document::GlyphRasterizer

use std::io::Write;

use tracing::{debug, trace};

use super::PclRenderer;
use crate::document::{GlyphAdjust, GlyphRun, Image};
use crate::error::Result;
use crate::geometry::{MPT_PER_DECIPOINT, Rect};
use crate::protocol::commands;
use crate::protocol::fonts::{self, BuiltinFont, encode_latin1};
use crate::render::resolution;

/// Spaces of a fixed width that the built-in fonts lack. They print as a
/// regular space.
pub fn is_fixed_width_space(c: char) -> bool {
    matches!(c, '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}')
}

/// Text as the built-in font will print it, or `None` if it cannot.
///
/// Control characters have no glyph and would be read as commands, so they
/// print as `#`.
pub fn native_text(text: &str) -> Option<Vec<u8>> {
    let normalized: String = text
        .chars()
        .map(|c| match c {
            c if is_fixed_width_space(c) => ' ',
            c if c.is_control() => '#',
            c => c,
        })
        .collect();
    encode_latin1(&normalized)
}

/// Cursor move after character `i`, in millipoints (x right, y up).
fn glyph_adjust(run: &GlyphRun, chars: &[char], i: usize) -> (f64, f64) {
    let adj = |k: usize| run.adjustments.get(k).copied().unwrap_or_default();
    let mut dx = 0.0;
    if chars[i] == ' ' {
        dx += run.word_spacing;
    }
    dx += run.letter_spacing;
    let GlyphAdjust {
        x_placement,
        y_placement,
        x_advance,
        y_advance,
    } = adj(i);
    dx += x_advance - x_placement;
    let mut dy = y_advance - y_placement;
    // the next glyph's own placement is part of the same move
    if i + 1 < chars.len() {
        let next = adj(i + 1);
        dx += next.x_placement;
        dy += next.y_placement;
    }
    (dx, dy)
}

impl<W: Write> PclRenderer<W> {
    pub(super) fn draw_text_native(&mut self, run: &GlyphRun, font: &BuiltinFont, bytes: &[u8]) -> Result<()> {
        let fmt = *self.writer.formatters();
        let size_pt = run.size / 1000.0;

        self.writer.set_transparency(true, false)?;
        let selection = (font.key, size_pt);
        if self.current_font != Some(selection) {
            trace!(font = font.key, size_pt, "selecting font");
            self.writer.write_bytes(&font.select(&fmt, size_pt))?;
            self.current_font = Some(selection);
        }
        self.writer.select_grayscale(run.color)?;
        self.writer.set_transparency(true, true)?;

        let origin = self.device_point(run.origin)?;
        self.writer.set_cursor(origin.x, origin.y)?;

        let first = run.adjustments.first().copied().unwrap_or_default();
        if first.x_placement != 0.0 {
            self.writer.write_bytes(&commands::move_horizontal(
                &fmt,
                first.x_placement / MPT_PER_DECIPOINT,
            ))?;
        }
        if first.y_placement != 0.0 {
            self.writer.write_bytes(&commands::move_vertical(
                &fmt,
                -first.y_placement / MPT_PER_DECIPOINT,
            ))?;
        }

        let chars: Vec<char> = run.text.chars().collect();
        let mut pending: Vec<u8> = Vec::with_capacity(bytes.len());
        for (i, &byte) in bytes.iter().enumerate() {
            pending.push(byte);
            let (dx, dy) = glyph_adjust(run, &chars, i);
            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            self.writer.write_bytes(&pending)?;
            pending.clear();
            if dx != 0.0 {
                self.writer
                    .write_bytes(&commands::move_horizontal(&fmt, dx / MPT_PER_DECIPOINT))?;
            }
            if dy != 0.0 {
                // device y grows downwards
                self.writer
                    .write_bytes(&commands::move_vertical(&fmt, -dy / MPT_PER_DECIPOINT))?;
            }
        }
        self.writer.write_bytes(&pending)
    }

    pub(super) fn draw_text_bitmap(&mut self, run: &GlyphRun) -> Result<()> {
        let dpi = resolution::select(
            self.config.device_resolution(),
            true,
            self.encoder.max_resolution(),
        )?;
        let Some(rasterizer) = self.rasterizer.as_ref() else {
            self.warn(format!(
                "no glyph rasterizer for text in font {:?}, run skipped",
                run.font
            ));
            return Ok(());
        };
        let Some(rendered) = rasterizer.rasterize(run, dpi)? else {
            self.warn(format!(
                "glyph rasterizer could not render font {:?}",
                run.font
            ));
            return Ok(());
        };
        debug!(font = %run.font, dpi, "text as bitmap");
        let area = Rect::new(
            run.origin.x + rendered.offset_x,
            run.origin.y + rendered.offset_y,
            rendered.width,
            rendered.height,
        );
        self.paint_mark(
            &Image::Raster(image::DynamicImage::ImageLuma8(rendered.image)),
            area,
        )
    }

    /// Native text when possible, bitmap otherwise.
    pub(super) fn emit_text(&mut self, run: &GlyphRun) -> Result<()> {
        if run.text.is_empty() {
            return Ok(());
        }
        if !self.config.all_text_as_bitmaps() {
            if let (Some(font), Some(bytes)) = (fonts::lookup(&run.font), native_text(&run.text)) {
                return self.draw_text_native(run, font, &bytes);
            }
        }
        self.draw_text_bitmap(run)
    }
}
