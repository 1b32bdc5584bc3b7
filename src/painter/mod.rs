//! # Page Emission
//!
//! [`PclRenderer`] turns a sequence of paint calls into one PCL job. Calls must
//! follow the document structure:
//!
//! ```text
//! start_document
//!   start_page ─ start_content ─ (groups, fills, borders, lines, images, text)* ─ end_content ─ end_page
//!   ...
//! end_document
//! ```
//!
//! Anything out of order fails with [`PrensaError::Sequence`] before a byte is
//! written.
//!
//! ## Example
//!
//! ```
//! use prensa::document::{Color, GlyphRun, PageSpec};
//! use prensa::geometry::{Point, Rect};
//! use prensa::painter::{PclRenderer, Renderer};
//! use prensa::printer::RenderConfig;
//!
//! let mut renderer = PclRenderer::new(Vec::new(), RenderConfig::default()).unwrap();
//! renderer.start_document().unwrap();
//! renderer.start_page(&PageSpec::new(595276.0, 841890.0)).unwrap();
//! renderer.start_content().unwrap();
//! renderer.fill_rect(Rect::new(72000.0, 72000.0, 144000.0, 2000.0), Color::BLACK).unwrap();
//! renderer
//!     .draw_text(&GlyphRun::new("F1", 12000.0, Point::new(72000.0, 100000.0), "Hello"))
//!     .unwrap();
//! renderer.end_content().unwrap();
//! renderer.end_page().unwrap();
//! renderer.end_document().unwrap();
//!
//! let bytes = renderer.into_inner();
//! assert!(bytes.ends_with(b"\x1b&l1T\x1bE\x1b%-12345X"));
//! ```

pub mod borders;
pub mod text;

use std::io::Write;

use tracing::{Level, debug, instrument, warn};

use crate::document::{
    BorderSet, Color, GlyphRasterizer, GlyphRun, Image, PageSpec, Rule, VectorGraphic,
};
use crate::error::{PrensaError, Result};
use crate::geometry::{
    Affine, MPT_PER_DECIPOINT, Point, PrintDirection, Rect, Size, TransformStack,
};
use crate::printer::{DitherMethod, PageFrame, PageFrameRegistry, RenderConfig};
use crate::protocol::{commands, hpgl};
use crate::protocol::writer::PclWriter;
use crate::render::encoder::RasterEncoder;
use crate::render::resolution;

use self::borders::BorderStrategy;

/// The paint operations a page-layout backend drives.
pub trait Renderer {
    fn start_document(&mut self) -> Result<()>;
    fn end_document(&mut self) -> Result<()>;

    fn start_page(&mut self, page: &PageSpec) -> Result<()>;
    fn end_page(&mut self) -> Result<()>;

    fn start_content(&mut self) -> Result<()>;
    fn end_content(&mut self) -> Result<()>;

    /// Enter a nested coordinate system.
    ///
    /// Fails with [`PrensaError::UnsupportedGeometry`] for transforms the
    /// device cannot express; nothing changes in that case and the caller may
    /// rasterize the group instead.
    fn start_group(&mut self, transform: &Affine) -> Result<()>;
    fn end_group(&mut self) -> Result<()>;

    /// Enter a viewport. PCL cannot clip, so `clip` is ignored.
    fn start_viewport(&mut self, transform: &Affine, _clip: Option<Rect>) -> Result<()> {
        self.start_group(transform)
    }

    fn end_viewport(&mut self) -> Result<()> {
        self.end_group()
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    /// Paint the borders of `rect`, filling `background` first.
    fn draw_borders(&mut self, rect: Rect, borders: &BorderSet, background: Option<Color>) -> Result<()>;

    fn draw_line(&mut self, rule: &Rule) -> Result<()>;

    /// Paint `image` scaled into `rect`.
    fn draw_image(&mut self, image: &Image, rect: Rect) -> Result<()>;

    fn draw_text(&mut self, run: &GlyphRun) -> Result<()>;

    /// Pass pre-rendered HP-GL/2 through, framed by `rect`.
    fn draw_vector(&mut self, graphic: &VectorGraphic, rect: Rect) -> Result<()>;
}

/// Where the renderer is in the document structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Document,
    Page,
    Content,
    Finished,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Document => "document",
            Self::Page => "page",
            Self::Content => "content",
            Self::Finished => "finished",
        }
    }
}

/// A degradation the renderer recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// PCL 5 implementation of [`Renderer`] writing to `W`.
pub struct PclRenderer<W: Write> {
    config: RenderConfig,
    writer: PclWriter<W>,
    encoder: RasterEncoder,
    registry: PageFrameRegistry,
    stack: TransformStack,
    phase: Phase,
    frame: Option<PageFrame>,
    /// Size of the last page whose format was sent.
    page_size: Option<(f64, f64)>,
    emitted_direction: PrintDirection,
    current_font: Option<(&'static str, f64)>,
    rasterizer: Option<Box<dyn GlyphRasterizer>>,
    diagnostics: Vec<Diagnostic>,
}

impl<W: Write> PclRenderer<W> {
    /// Validate `config` and set up a renderer over `sink`.
    pub fn new(sink: W, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let writer = PclWriter::new(sink, config.pattern_size()?);
        let encoder = RasterEncoder::from_config(&config)?;
        debug!(
            resolution = config.device_resolution(),
            converter = encoder.converter_name(),
            mode = ?config.rendering_mode,
            "renderer ready"
        );
        Ok(Self {
            config,
            writer,
            encoder,
            registry: PageFrameRegistry::builtin(),
            stack: TransformStack::new(),
            phase: Phase::Created,
            frame: None,
            page_size: None,
            emitted_direction: PrintDirection::Deg0,
            current_font: None,
            rasterizer: None,
            diagnostics: Vec::new(),
        })
    }

    /// Use a custom media table.
    pub fn with_registry(mut self, registry: PageFrameRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Render text the built-in fonts cannot print through `rasterizer`.
    pub fn with_glyph_rasterizer(mut self, rasterizer: impl GlyphRasterizer + 'static) -> Self {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Frame of the current page.
    pub fn page_frame(&self) -> Option<&PageFrame> {
        self.frame.as_ref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn bytes_written(&self) -> u64 {
        self.writer.bytes_written()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    // ========================================================================
    // STATE
    // ========================================================================

    fn expect(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(PrensaError::Sequence {
                expected: expected.name(),
                found: self.phase.name(),
            })
        }
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.diagnostics.push(Diagnostic {
            level: Level::WARN,
            message,
        });
    }

    fn device_point(&self, p: Point) -> Result<Point> {
        let frame = self.frame.as_ref().ok_or(PrensaError::Sequence {
            expected: Phase::Page.name(),
            found: self.phase.name(),
        })?;
        Ok(self.stack.to_device(p, frame))
    }

    fn sync_direction(&mut self) -> Result<()> {
        let direction = self.stack.direction();
        if direction != self.emitted_direction {
            self.writer.set_print_direction(direction)?;
            self.emitted_direction = direction;
        }
        Ok(())
    }

    fn border_strategy(&self) -> BorderStrategy {
        if self.config.is_speed_optimized() {
            BorderStrategy::Fast
        } else {
            BorderStrategy::Quality
        }
    }

    /// Resolution marks (borders, rules, bitmap text) are rasterized at.
    fn mark_resolution(&self) -> Result<u32> {
        resolution::select(
            self.config.device_resolution(),
            true,
            self.encoder.max_resolution(),
        )
    }

    /// Send the page format commands if the size differs from the last page.
    fn select_page_format(&mut self, width: f64, height: f64) -> Result<()> {
        if self.page_size == Some((width, height)) {
            return Ok(());
        }
        let selection = self.registry.select(width, height);
        if selection.fallback {
            // the registry already logged it
            self.diagnostics.push(Diagnostic {
                level: Level::WARN,
                message: format!(
                    "no media definition for {}x{} mpt, using {}",
                    width,
                    height,
                    selection.frame.name()
                ),
            });
        }
        let frame = selection.frame;
        debug!(frame = frame.name(), selector = frame.selector(), "page format");
        let mut out = commands::orientation(frame.is_landscape());
        out.extend(commands::page_size(frame.selector()));
        out.extend(commands::clear_horizontal_margins());
        out.extend(commands::top_margin(0));
        self.writer.write_bytes(&out)?;
        self.frame = Some(frame);
        self.page_size = Some((width, height));
        Ok(())
    }

    /// Paint a rasterized mark over `area` with white pixels left transparent.
    fn paint_mark(&mut self, image: &Image, area: Rect) -> Result<()> {
        let origin = self.device_point(area.origin())?;
        let (width, height) = self.stack.to_device_size(area.width, area.height);
        let method = if self.config.is_speed_optimized() {
            DitherMethod::Threshold
        } else {
            DitherMethod::Ordered
        };
        self.writer.set_cursor(origin.x, origin.y)?;
        self.encoder.paint(
            &mut self.writer,
            image,
            Size::new(width, height),
            true,
            method,
        )
    }
}

impl<W: Write> Renderer for PclRenderer<W> {
    #[instrument(skip(self), fields(resolution = self.config.device_resolution()))]
    fn start_document(&mut self) -> Result<()> {
        self.expect(Phase::Created)?;
        let resolution = self.config.device_resolution();
        if !self.config.disable_pjl {
            self.writer.write_bytes(&commands::universal_exit())?;
            let mut pjl = format!("@PJL COMMENT Produced by {}\n", self.config.producer);
            if let Some(name) = &self.config.job_name {
                pjl.push_str(&format!("@PJL JOB NAME = \"{}\"\n", name));
            }
            pjl.push_str(&format!("@PJL SET RESOLUTION = {}\n", resolution));
            pjl.push_str("@PJL ENTER LANGUAGE = PCL\n");
            self.writer.write_raw(&pjl)?;
        }
        self.writer.reset_printer()?;
        self.writer
            .write_bytes(&commands::unit_of_measure(resolution))?;
        self.writer
            .write_bytes(&commands::raster_resolution(resolution))?;
        self.current_font = None;
        self.phase = Phase::Document;
        Ok(())
    }

    #[instrument(skip(self), fields(bytes = self.writer.bytes_written()))]
    fn end_document(&mut self) -> Result<()> {
        self.expect(Phase::Document)?;
        self.writer.write_bytes(&commands::separate_jobs())?;
        self.writer.reset_printer()?;
        if !self.config.disable_pjl {
            self.writer.write_bytes(&commands::universal_exit())?;
        }
        self.writer.flush()?;
        self.phase = Phase::Finished;
        Ok(())
    }

    #[instrument(skip(self, page), fields(width = page.width, height = page.height))]
    fn start_page(&mut self, page: &PageSpec) -> Result<()> {
        self.expect(Phase::Document)?;
        if let Some(tray) = page.paper_source {
            self.writer.write_bytes(&commands::paper_source(tray))?;
        }
        if let Some(bin) = page.output_bin {
            self.writer.write_bytes(&commands::output_bin(bin))?;
        }
        if let Some(mode) = page.duplex {
            self.writer.write_bytes(&commands::duplex(mode))?;
        }
        self.select_page_format(page.width, page.height)?;
        self.stack.reset();
        self.phase = Phase::Page;
        Ok(())
    }

    #[instrument(skip(self))]
    fn end_page(&mut self) -> Result<()> {
        self.expect(Phase::Page)?;
        self.writer.form_feed()?;
        self.phase = Phase::Document;
        Ok(())
    }

    fn start_content(&mut self) -> Result<()> {
        self.expect(Phase::Page)?;
        self.stack.reset();
        self.phase = Phase::Content;
        Ok(())
    }

    fn end_content(&mut self) -> Result<()> {
        self.expect(Phase::Content)?;
        let open = self.stack.depth();
        if open > 0 {
            self.warn(format!("{} group(s) still open at end of content", open));
        }
        self.stack.reset();
        self.sync_direction()?;
        self.phase = Phase::Page;
        Ok(())
    }

    fn start_group(&mut self, transform: &Affine) -> Result<()> {
        self.expect(Phase::Content)?;
        if let Err(err) = self.stack.push(transform) {
            self.warn(format!("group skipped: {}", err));
            return Err(err);
        }
        self.sync_direction()
    }

    fn end_group(&mut self) -> Result<()> {
        self.expect(Phase::Content)?;
        if self.stack.pop().is_none() {
            return Err(PrensaError::Sequence {
                expected: "group",
                found: Phase::Content.name(),
            });
        }
        self.sync_direction()
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.expect(Phase::Content)?;
        if rect.is_empty() {
            return Ok(());
        }
        let origin = self.device_point(rect.origin())?;
        let (width, height) = self.stack.to_device_size(rect.width, rect.height);
        self.writer.set_cursor(origin.x, origin.y)?;
        self.writer.fill_rect(width, height, color)
    }

    fn draw_borders(&mut self, rect: Rect, borders: &BorderSet, background: Option<Color>) -> Result<()> {
        self.expect(Phase::Content)?;
        if let Some(color) = background {
            self.fill_rect(borders::background_rect(rect, borders), color)?;
        }
        if borders.is_empty() {
            return Ok(());
        }
        match self.border_strategy() {
            BorderStrategy::Fast => {
                for (edge, color) in borders::fast_rects(rect, borders) {
                    self.fill_rect(edge, color)?;
                }
                Ok(())
            }
            BorderStrategy::Quality => {
                let dpi = self.mark_resolution()?;
                match borders::rasterize(rect, borders, dpi)? {
                    Some(mark) => self.paint_mark(
                        &Image::Raster(image::DynamicImage::ImageLuma8(mark.image)),
                        mark.area,
                    ),
                    None => Ok(()),
                }
            }
        }
    }

    fn draw_line(&mut self, rule: &Rule) -> Result<()> {
        self.expect(Phase::Content)?;
        if !rule.is_horizontal() && !rule.is_vertical() {
            return Err(PrensaError::InvalidArgument(format!(
                "only horizontal and vertical rules can be drawn, got {:?} to {:?}",
                rule.start, rule.end
            )));
        }
        match self.border_strategy() {
            BorderStrategy::Fast => self.fill_rect(rule.bounds(), rule.color),
            BorderStrategy::Quality => {
                let dpi = self.mark_resolution()?;
                match borders::rasterize_rule(rule, dpi)? {
                    Some(mark) => self.paint_mark(
                        &Image::Raster(image::DynamicImage::ImageLuma8(mark.image)),
                        mark.area,
                    ),
                    None => Ok(()),
                }
            }
        }
    }

    fn draw_image(&mut self, image: &Image, rect: Rect) -> Result<()> {
        self.expect(Phase::Content)?;
        if rect.is_empty() {
            return Ok(());
        }
        let origin = self.device_point(rect.origin())?;
        let (width, height) = self.stack.to_device_size(rect.width, rect.height);
        self.writer.set_cursor(origin.x, origin.y)?;
        self.encoder.paint(
            &mut self.writer,
            image,
            Size::new(width, height),
            false,
            self.config.image_dithering,
        )
    }

    fn draw_text(&mut self, run: &GlyphRun) -> Result<()> {
        self.expect(Phase::Content)?;
        self.emit_text(run)
    }

    fn draw_vector(&mut self, graphic: &VectorGraphic, rect: Rect) -> Result<()> {
        self.expect(Phase::Content)?;
        if !graphic.instructions.is_ascii() || graphic.instructions.contains('\x1b') {
            return Err(PrensaError::InvalidArgument(
                "HP-GL/2 instructions must be ASCII without escape characters".to_string(),
            ));
        }
        if !(graphic.scale.is_finite() && graphic.scale > 0.0) {
            return Err(PrensaError::InvalidArgument(format!(
                "HP-GL/2 scale must be positive, got {}",
                graphic.scale
            )));
        }
        if rect.is_empty() {
            return Ok(());
        }
        let origin = self.device_point(rect.origin())?;
        let (width, height) = self.stack.to_device_size(rect.width, rect.height);
        self.writer.set_cursor(origin.x, origin.y)?;
        let fmt = *self.writer.formatters();
        let frame = hpgl::picture_frame(
            &fmt,
            width / MPT_PER_DECIPOINT,
            height / MPT_PER_DECIPOINT,
            graphic.scale,
            graphic.instructions.as_bytes(),
        );
        self.writer.write_bytes(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BorderSpec, BorderStyle};
    use crate::printer::RenderingMode;
    use pretty_assertions::assert_eq;

    fn renderer(mode: RenderingMode) -> PclRenderer<Vec<u8>> {
        let config = RenderConfig {
            rendering_mode: mode,
            disable_pjl: true,
            ..RenderConfig::default()
        };
        let mut r = PclRenderer::new(Vec::new(), config).unwrap();
        r.start_document().unwrap();
        r.start_page(&PageSpec::new(612000.0, 792000.0)).unwrap();
        r.start_content().unwrap();
        r
    }

    fn tail_after(r: PclRenderer<Vec<u8>>, mark: u64) -> Vec<u8> {
        r.into_inner()[mark as usize..].to_vec()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = RenderConfig {
            pattern_matrix_size: 5,
            ..RenderConfig::default()
        };
        assert!(matches!(
            PclRenderer::new(Vec::new(), config),
            Err(PrensaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_paint_before_page_is_sequence_error() {
        let mut r = PclRenderer::new(Vec::new(), RenderConfig::default()).unwrap();
        r.start_document().unwrap();
        let written = r.bytes_written();
        let err = r
            .fill_rect(Rect::new(0.0, 0.0, 100.0, 100.0), Color::BLACK)
            .unwrap_err();
        assert!(matches!(
            err,
            PrensaError::Sequence {
                expected: "content",
                found: "document"
            }
        ));
        assert_eq!(r.bytes_written(), written);
    }

    #[test]
    fn test_fill_rect_at_letter_origin() {
        let mut r = renderer(RenderingMode::Quality);
        let mark = r.bytes_written();
        // Letter logical page starts 75/300 inch from the left edge
        r.fill_rect(Rect::new(18000.0, 0.0, 7200.0, 7200.0), Color::BLACK)
            .unwrap();
        assert_eq!(
            tail_after(r, mark),
            b"\x1b&a0h0V\x1b*v1O\x1b*c72h72V\x1b*c100G\x1b*c2P\x1b*v0O".to_vec()
        );
    }

    #[test]
    fn test_group_direction_emitted_once() {
        let mut r = renderer(RenderingMode::Quality);
        let mark = r.bytes_written();
        let turn = Affine::quarter_turn(PrintDirection::Deg90);
        r.start_group(&turn).unwrap();
        r.start_group(&Affine::translate(100.0, 0.0)).unwrap();
        r.end_group().unwrap();
        r.end_group().unwrap();
        assert_eq!(tail_after(r, mark), b"\x1b&a90P\x1b&a0P".to_vec());
    }

    #[test]
    fn test_viewport_translates() {
        let mut r = renderer(RenderingMode::Quality);
        r.start_viewport(&Affine::translate(7200.0, 0.0), Some(Rect::new(0.0, 0.0, 10.0, 10.0)))
            .unwrap();
        let mark = r.bytes_written();
        r.fill_rect(Rect::new(18000.0, 0.0, 100.0, 100.0), Color::BLACK)
            .unwrap();
        r.end_viewport().unwrap();
        assert!(tail_after(r, mark).starts_with(b"\x1b&a72h0V"));
    }

    #[test]
    fn test_unsupported_group_leaves_state() {
        let mut r = renderer(RenderingMode::Quality);
        let err = r.start_group(&Affine::rotate(0.5)).unwrap_err();
        assert!(matches!(err, PrensaError::UnsupportedGeometry(_)));
        assert_eq!(r.diagnostics().len(), 1);
        assert!(r.end_group().is_err());
    }

    #[test]
    fn test_end_content_resets_open_groups() {
        let mut r = renderer(RenderingMode::Quality);
        r.start_group(&Affine::quarter_turn(PrintDirection::Deg180))
            .unwrap();
        let mark = r.bytes_written();
        r.end_content().unwrap();
        assert_eq!(r.diagnostics().len(), 1);
        assert_eq!(r.phase(), Phase::Page);
        assert_eq!(tail_after(r, mark), b"\x1b&a0P".to_vec());
    }

    #[test]
    fn test_end_content_counts_every_open_group() {
        let mut r = renderer(RenderingMode::Quality);
        r.start_group(&Affine::translate(100.0, 0.0)).unwrap();
        r.start_group(&Affine::translate(0.0, 100.0)).unwrap();
        r.end_content().unwrap();
        assert_eq!(r.diagnostics().len(), 1);
        assert_eq!(r.diagnostics()[0].level, Level::WARN);
        assert!(r.diagnostics()[0].message.starts_with("2 group(s)"));
    }

    #[test]
    fn test_speed_borders_are_rectangles() {
        let mut r = renderer(RenderingMode::Speed);
        let mark = r.bytes_written();
        let borders = BorderSet {
            before: Some(BorderSpec::solid(1000.0, Color::BLACK)),
            ..BorderSet::default()
        };
        r.draw_borders(Rect::new(18000.0, 0.0, 72000.0, 36000.0), &borders, None)
            .unwrap();
        assert_eq!(
            tail_after(r, mark),
            b"\x1b&a0h0V\x1b*v1O\x1b*c720h10V\x1b*c100G\x1b*c2P\x1b*v0O".to_vec()
        );
    }

    #[test]
    fn test_empty_borders_write_nothing() {
        for mode in [RenderingMode::Speed, RenderingMode::Quality] {
            let mut r = renderer(mode);
            let mark = r.bytes_written();
            r.draw_borders(Rect::new(0.0, 0.0, 1000.0, 1000.0), &BorderSet::default(), None)
                .unwrap();
            assert_eq!(r.bytes_written(), mark);
        }
    }

    #[test]
    fn test_quality_border_is_one_raster() {
        let mut r = renderer(RenderingMode::Quality);
        let mark = r.bytes_written();
        let spec = BorderSpec::solid(2000.0, Color::BLACK).with_style(BorderStyle::Dashed);
        r.draw_borders(Rect::new(18000.0, 0.0, 72000.0, 72000.0), &BorderSet::uniform(spec), None)
            .unwrap();
        let bytes = tail_after(r, mark);
        assert!(bytes.starts_with(b"\x1b&a0h0V\x1b*v0T\x1b*t600R\x1b*r0f600t600s1A"));
        assert!(bytes.ends_with(b"\x1b*rB"));
    }

    #[test]
    fn test_vector_rejects_non_ascii() {
        let mut r = renderer(RenderingMode::Quality);
        let graphic = VectorGraphic {
            instructions: "PD\u{e9};".to_string(),
            scale: 1.0,
        };
        assert!(matches!(
            r.draw_vector(&graphic, Rect::new(0.0, 0.0, 100.0, 100.0)),
            Err(PrensaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_text_without_rasterizer_is_skipped() {
        let mut r = renderer(RenderingMode::Bitmap);
        let mark = r.bytes_written();
        r.draw_text(&GlyphRun::new("F1", 12000.0, Point::new(0.0, 0.0), "x"))
            .unwrap();
        assert_eq!(r.bytes_written(), mark);
        assert_eq!(r.diagnostics().len(), 1);
    }
}
