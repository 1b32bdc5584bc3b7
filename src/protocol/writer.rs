//! # PCL Command Writer
//!
//! Thin layer over a byte sink. It writes escape commands and Latin-1 text,
//! counts what went out, and tracks the device state that is not scoped to a
//! graphics level: source and pattern transparency and the temporary gray
//! pattern.
//!
//! ```
//! use prensa::document::Color;
//! use prensa::protocol::pattern::MatrixSize;
//! use prensa::protocol::writer::PclWriter;
//!
//! let mut writer = PclWriter::new(Vec::new(), MatrixSize::Four);
//! writer.set_cursor(7200.0, 14400.0).unwrap();
//! writer.fill_rect(72000.0, 1000.0, Color::BLACK).unwrap();
//! let bytes = writer.into_inner();
//! assert!(bytes.starts_with(b"\x1b&a72h144V\x1b*v1O\x1b*c720h10V\x1b*c100G\x1b*c2P"));
//! ```

use std::io::Write;

use tracing::trace;

use super::commands::{self, PatternKind};
use super::fonts::encode_latin1;
use super::format::Formatters;
use super::pattern::MatrixSize;
use super::raster;
use crate::document::Color;
use crate::error::{PrensaError, Result};
use crate::geometry::{MPT_PER_DECIPOINT, PrintDirection};
use crate::render::bitmap::MonochromeBitmap;
use crate::render::patterns::{PatternCache, PatternRef, PatternSelection};

pub struct PclWriter<W: Write> {
    sink: W,
    fmt: Formatters,
    bytes_written: u64,
    source_transparent: bool,
    pattern_transparent: bool,
    patterns: PatternCache,
}

impl<W: Write> PclWriter<W> {
    pub fn new(sink: W, pattern_size: MatrixSize) -> Self {
        Self::with_formatters(sink, Formatters::pcl(), pattern_size)
    }

    pub fn with_formatters(sink: W, fmt: Formatters, pattern_size: MatrixSize) -> Self {
        Self {
            sink,
            fmt,
            bytes_written: 0,
            source_transparent: true,
            pattern_transparent: true,
            patterns: PatternCache::new(pattern_size),
        }
    }

    pub fn formatters(&self) -> &Formatters {
        &self.fmt
    }

    /// Total bytes handed to the sink.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Current (source, pattern) transparency.
    pub fn transparency(&self) -> (bool, bool) {
        (self.source_transparent, self.pattern_transparent)
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    // ========================================================================
    // PRIMITIVES
    // ========================================================================

    /// Write bytes verbatim.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.sink.write_all(data)?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Write `ESC` followed by `body`.
    pub fn write_command(&mut self, body: &str) -> Result<()> {
        self.write_bytes(&commands::escape(body))
    }

    /// Write text in ISO 8859-1.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        let encoded = encode_latin1(text).ok_or_else(|| {
            PrensaError::InvalidArgument(format!("text is not ISO 8859-1: {:?}", text))
        })?;
        self.write_bytes(&encoded)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    // ========================================================================
    // STATE
    // ========================================================================

    /// Send `ESC E` and forget every piece of device state it clears.
    pub fn reset_printer(&mut self) -> Result<()> {
        self.write_bytes(&commands::reset())?;
        self.source_transparent = true;
        self.pattern_transparent = true;
        self.patterns.invalidate();
        Ok(())
    }

    /// Set both transparency modes, sending only what changes.
    pub fn set_transparency(&mut self, source: bool, pattern: bool) -> Result<()> {
        let source_changed = source != self.source_transparent;
        let pattern_changed = pattern != self.pattern_transparent;
        self.source_transparent = source;
        self.pattern_transparent = pattern;
        match (source_changed, pattern_changed) {
            (true, true) => self.write_bytes(&commands::transparency(source, pattern)),
            (true, false) => self.write_bytes(&commands::source_transparency(source)),
            (false, true) => self.write_bytes(&commands::pattern_transparency(pattern)),
            (false, false) => Ok(()),
        }
    }

    pub fn set_source_transparency(&mut self, transparent: bool) -> Result<()> {
        self.set_transparency(transparent, self.pattern_transparent)
    }

    pub fn set_pattern_transparency(&mut self, transparent: bool) -> Result<()> {
        self.set_transparency(self.source_transparent, transparent)
    }

    // ========================================================================
    // CURSOR
    // ========================================================================

    /// Absolute cursor position, device coordinates in millipoints.
    pub fn set_cursor(&mut self, x_mpt: f64, y_mpt: f64) -> Result<()> {
        let cmd = commands::cursor_position(
            &self.fmt,
            x_mpt / MPT_PER_DECIPOINT,
            y_mpt / MPT_PER_DECIPOINT,
        );
        self.write_bytes(&cmd)
    }

    pub fn push_cursor(&mut self) -> Result<()> {
        self.write_bytes(&commands::push_cursor())
    }

    pub fn pop_cursor(&mut self) -> Result<()> {
        self.write_bytes(&commands::pop_cursor())
    }

    pub fn set_print_direction(&mut self, direction: PrintDirection) -> Result<()> {
        self.write_bytes(&commands::print_direction(direction))
    }

    pub fn form_feed(&mut self) -> Result<()> {
        self.write_bytes(&[commands::FF])
    }

    // ========================================================================
    // FILLS AND PATTERNS
    // ========================================================================

    fn download(&mut self, selection: &PatternSelection) -> Result<()> {
        let (PatternRef::Dithered(id), Some(payload)) = (selection.pattern, &selection.download)
        else {
            return Ok(());
        };
        trace!(id, len = payload.len(), "downloading gray pattern");
        let mut out = commands::pattern_id(id);
        out.extend(commands::define_pattern(payload.len()));
        out.extend_from_slice(payload);
        out.extend(commands::make_pattern_temporary());
        self.write_bytes(&out)
    }

    /// Fill a rectangle of `width` x `height` millipoints at the cursor.
    ///
    /// Black and white use the shading fill, other colors a dithered pattern.
    /// A zero dimension writes nothing.
    pub fn fill_rect(&mut self, width_mpt: f64, height_mpt: f64, color: Color) -> Result<()> {
        if width_mpt == 0.0 || height_mpt == 0.0 {
            return Ok(());
        }
        let size = commands::rectangle_size(
            &self.fmt,
            width_mpt.abs() / MPT_PER_DECIPOINT,
            height_mpt.abs() / MPT_PER_DECIPOINT,
        );
        self.set_pattern_transparency(false)?;
        let selection = self.patterns.pattern_for(color);
        match selection.pattern {
            PatternRef::Black | PatternRef::White => {
                let mut out = size;
                out.extend(commands::pattern_id(color.shade_percent()));
                out.extend(commands::fill_rectangle(PatternKind::Shading));
                self.write_bytes(&out)?;
            }
            PatternRef::Dithered(id) => {
                self.download(&selection)?;
                let mut out = size;
                out.extend(commands::pattern_id(id));
                out.extend(commands::fill_rectangle(PatternKind::UserDefined));
                self.write_bytes(&out)?;
            }
        }
        self.set_pattern_transparency(true)
    }

    /// Make `color` the current pattern for text and rasters.
    pub fn select_grayscale(&mut self, color: Color) -> Result<()> {
        let selection = self.patterns.pattern_for(color);
        match selection.pattern {
            PatternRef::Black => self.select_pattern(PatternKind::SolidBlack),
            PatternRef::White => self.select_pattern(PatternKind::SolidWhite),
            PatternRef::Dithered(id) => {
                self.download(&selection)?;
                self.write_bytes(&commands::pattern_id(id))?;
                self.select_pattern(PatternKind::UserDefined)
            }
        }
    }

    pub fn select_pattern(&mut self, kind: PatternKind) -> Result<()> {
        self.write_bytes(&commands::select_pattern(kind))
    }

    // ========================================================================
    // RASTER
    // ========================================================================

    /// Transfer a monochrome bitmap at the cursor, `dpi` dots per inch.
    pub fn paint_monochrome(&mut self, bitmap: &MonochromeBitmap, dpi: u32) -> Result<()> {
        if bitmap.is_empty() {
            return Ok(());
        }
        let mut out = commands::raster_resolution(dpi);
        out.extend(raster::start_raster(bitmap.width(), bitmap.height()));
        let mut compressed = 0usize;
        for row in bitmap.rows() {
            let encoded = raster::encode_row(row);
            if encoded.mode == raster::Compression::RunLength {
                compressed += 1;
            }
            out.extend(raster::transfer_header(encoded.mode, encoded.payload.len()));
            out.extend_from_slice(&encoded.payload);
        }
        out.extend(raster::end_raster());
        trace!(
            width = bitmap.width(),
            height = bitmap.height(),
            dpi,
            compressed,
            bytes = out.len(),
            "raster transfer"
        );
        self.write_bytes(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn writer() -> PclWriter<Vec<u8>> {
        PclWriter::new(Vec::new(), MatrixSize::Four)
    }

    #[test]
    fn test_write_command_and_count() {
        let mut w = writer();
        w.write_command("E").unwrap();
        w.write_raw("é").unwrap();
        assert_eq!(w.bytes_written(), 3);
        assert_eq!(w.into_inner(), vec![0x1B, b'E', 0xE9]);
    }

    #[test]
    fn test_write_raw_rejects_non_latin1() {
        let mut w = writer();
        assert!(matches!(
            w.write_raw("€"),
            Err(PrensaError::InvalidArgument(_))
        ));
        assert_eq!(w.bytes_written(), 0);
    }

    #[test]
    fn test_transparency_only_on_change() {
        let mut w = writer();
        w.set_transparency(true, true).unwrap();
        assert_eq!(w.bytes_written(), 0);
        w.set_transparency(false, true).unwrap();
        w.set_transparency(false, false).unwrap();
        w.set_transparency(true, true).unwrap();
        assert_eq!(w.into_inner(), b"\x1b*v1N\x1b*v1O\x1b*v0n0O".to_vec());
    }

    #[test]
    fn test_negative_cursor() {
        let mut w = writer();
        w.set_cursor(-1050.0, 2000.0).unwrap();
        assert_eq!(w.into_inner(), b"\x1b&a0h-10.5h20V".to_vec());
    }

    #[test]
    fn test_fill_white() {
        let mut w = writer();
        w.fill_rect(1000.0, 2000.0, Color::WHITE).unwrap();
        assert_eq!(
            w.into_inner(),
            b"\x1b*v1O\x1b*c10h20V\x1b*c0G\x1b*c2P\x1b*v0O".to_vec()
        );
    }

    #[test]
    fn test_fill_gray_downloads_once() {
        let mut w = writer();
        w.fill_rect(1000.0, 1000.0, Color::gray(128)).unwrap();
        let first = w.bytes_written();
        w.fill_rect(1000.0, 1000.0, Color::gray(128)).unwrap();
        let second = w.bytes_written() - first;
        let bytes = w.into_inner();
        let prefix = b"\x1b*v1O\x1b*c32G\x1b*c16W";
        assert_eq!(&bytes[..prefix.len()], prefix);
        // the second fill carries no download
        assert!(second < first);
        assert!(bytes.ends_with(b"\x1b*c10h10V\x1b*c32G\x1b*c4P\x1b*v0O"));
    }

    #[test]
    fn test_zero_fill_writes_nothing() {
        let mut w = writer();
        w.fill_rect(0.0, 1000.0, Color::BLACK).unwrap();
        w.fill_rect(1000.0, 0.0, Color::gray(10)).unwrap();
        assert_eq!(w.bytes_written(), 0);
    }

    #[test]
    fn test_select_grayscale() {
        let mut w = writer();
        w.select_grayscale(Color::BLACK).unwrap();
        w.select_grayscale(Color::WHITE).unwrap();
        assert_eq!(w.into_inner(), b"\x1b*v0T\x1b*v1T".to_vec());

        let mut w = writer();
        w.select_grayscale(Color::gray(90)).unwrap();
        let bytes = w.into_inner();
        assert!(bytes.ends_with(b"\x1b*c4Q\x1b*c32G\x1b*v4T"));
    }

    #[test]
    fn test_reset_restores_state() {
        let mut w = writer();
        w.set_transparency(false, false).unwrap();
        w.select_grayscale(Color::gray(90)).unwrap();
        w.reset_printer().unwrap();
        assert_eq!(w.transparency(), (true, true));
        let before = w.bytes_written();
        w.select_grayscale(Color::gray(90)).unwrap();
        // pattern downloaded again after the reset
        assert!(w.bytes_written() - before > 20);
    }

    #[test]
    fn test_paint_monochrome() {
        let mut w = writer();
        let bitmap = MonochromeBitmap::from_fn(16, 2, |x, _| x < 8);
        w.paint_monochrome(&bitmap, 300).unwrap();
        assert_eq!(
            w.into_inner(),
            b"\x1b*t300R\x1b*r0f2t16s1A\x1b*b0m2W\xff\x00\x1b*b0m2W\xff\x00\x1b*rB".to_vec()
        );
    }

    #[test]
    fn test_io_error_propagates() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut w = PclWriter::new(Broken, MatrixSize::Four);
        assert!(matches!(w.write_command("E"), Err(PrensaError::Io(_))));
    }
}
