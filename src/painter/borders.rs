//! # Border Compositing
//!
//! Two ways to paint the borders of a rectangle:
//!
//! - **Fast**: every edge is one filled rectangle of its own width. Corners
//!   simply overlap.
//! - **Quality**: every edge is a trapezoid between the outer and the inner
//!   border boundary, so corners are mitered. The whole border is rasterized
//!   once and sent as a single bitmap.
//!
//! ```text
//!  O.tl ┌──────────────────────────┐ O.tr
//!       │╲        before          ╱│
//!       │ ╲ I.tl ┌────────┐ I.tr ╱ │
//!       │st│     │        │     │end
//!       │ ╱ I.bl └────────┘ I.br ╲ │
//!       │╱         after          ╲│
//!  O.bl └──────────────────────────┘ O.br
//! ```
//!
//! A collapsed outer edge straddles the rectangle: half its width lies
//! outside, which moves the outer boundary out by that half.

use image::GrayImage;
use tiny_skia::{FillRule, Mask, Paint, Path, PathBuilder, Pixmap, Transform};

use crate::document::{BorderSet, BorderSpec, BorderStyle, Color, Rule};
use crate::error::{PrensaError, Result};
use crate::geometry::{MPT_PER_INCH, Point, Rect, mpt_to_px};
use crate::render::encoder::MAX_PIXELS;

/// Border painting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStrategy {
    Fast,
    Quality,
}

/// Four corners, outer edge first.
pub type Quad = [Point; 4];

/// A rasterized mark and the page area it covers.
#[derive(Debug, Clone)]
pub struct MarkBitmap {
    pub image: GrayImage,
    pub area: Rect,
}

struct Widths {
    before: f64,
    end: f64,
    after: f64,
    start: f64,
}

fn widths(borders: &BorderSet) -> Widths {
    Widths {
        before: BorderSet::width_of(borders.before.as_ref()),
        end: BorderSet::width_of(borders.end.as_ref()),
        after: BorderSet::width_of(borders.after.as_ref()),
        start: BorderSet::width_of(borders.start.as_ref()),
    }
}

fn clipped(spec: Option<&BorderSpec>) -> f64 {
    spec.filter(|s| s.is_visible())
        .map_or(0.0, |s| s.clipped_width())
}

/// Outer boundary of the painted border.
pub fn outer_rect(rect: Rect, borders: &BorderSet) -> Rect {
    rect.outset(
        clipped(borders.before.as_ref()),
        clipped(borders.end.as_ref()),
        clipped(borders.after.as_ref()),
        clipped(borders.start.as_ref()),
    )
}

/// Inner boundary of the painted border; the background fills exactly this.
pub fn inner_rect(rect: Rect, borders: &BorderSet) -> Rect {
    let w = widths(borders);
    rect.inset(
        w.before - clipped(borders.before.as_ref()),
        w.end - clipped(borders.end.as_ref()),
        w.after - clipped(borders.after.as_ref()),
        w.start - clipped(borders.start.as_ref()),
    )
}

/// Area the background fills: `rect` inset by the full width of every present
/// edge.
pub fn background_rect(rect: Rect, borders: &BorderSet) -> Rect {
    let w = widths(borders);
    rect.inset(w.before, w.end, w.after, w.start)
}

/// Fast strategy: one rectangle per visible edge, in before, end, after,
/// start order.
pub fn fast_rects(rect: Rect, borders: &BorderSet) -> Vec<(Rect, Color)> {
    let mut out = Vec::with_capacity(4);
    let visible = |s: &Option<BorderSpec>| s.filter(|s| s.is_visible());
    if let Some(b) = visible(&borders.before) {
        out.push((Rect::new(rect.x, rect.y, rect.width, b.width), b.color));
    }
    if let Some(e) = visible(&borders.end) {
        out.push((
            Rect::new(rect.right() - e.width, rect.y, e.width, rect.height),
            e.color,
        ));
    }
    if let Some(a) = visible(&borders.after) {
        out.push((
            Rect::new(rect.x, rect.bottom() - a.width, rect.width, a.width),
            a.color,
        ));
    }
    if let Some(s) = visible(&borders.start) {
        out.push((Rect::new(rect.x, rect.y, s.width, rect.height), s.color));
    }
    out
}

/// Quality strategy: the mitered trapezoid of each visible edge, in before,
/// end, after, start order.
pub fn edge_quads(rect: Rect, borders: &BorderSet) -> [Option<(Quad, BorderSpec)>; 4] {
    let o = outer_rect(rect, borders);
    let i = inner_rect(rect, borders);
    let (otl, otr, obr, obl) = corners(&o);
    let (itl, itr, ibr, ibl) = corners(&i);
    let visible = |s: &Option<BorderSpec>| s.filter(|s| s.is_visible());
    [
        visible(&borders.before).map(|s| ([otl, otr, itr, itl], s)),
        visible(&borders.end).map(|s| ([otr, obr, ibr, itr], s)),
        visible(&borders.after).map(|s| ([obr, obl, ibl, ibr], s)),
        visible(&borders.start).map(|s| ([obl, otl, itl, ibl], s)),
    ]
}

fn corners(r: &Rect) -> (Point, Point, Point, Point) {
    (
        Point::new(r.x, r.y),
        Point::new(r.right(), r.y),
        Point::new(r.right(), r.bottom()),
        Point::new(r.x, r.bottom()),
    )
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Strip of a quad between fractions `t0` and `t1` of the way from the
/// outer to the inner edge.
fn strip(q: &Quad, t0: f64, t1: f64) -> Quad {
    [
        lerp(q[0], q[3], t0),
        lerp(q[1], q[2], t0),
        lerp(q[1], q[2], t1),
        lerp(q[0], q[3], t1),
    ]
}

fn quad_path(q: &Quad) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(q[0].x as f32, q[0].y as f32);
    for p in &q[1..] {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    pb.finish()
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = false;
    paint
}

/// Off-screen canvas covering `area` at `dpi`, white background.
struct Canvas {
    pixmap: Pixmap,
    transform: Transform,
    area: Rect,
}

impl Canvas {
    fn new(area: Rect, dpi: u32) -> Result<Self> {
        let px_width = mpt_to_px(area.width, dpi).ceil().max(1.0);
        let px_height = mpt_to_px(area.height, dpi).ceil().max(1.0);
        let pixels = px_width * px_height;
        if !pixels.is_finite() || pixels > MAX_PIXELS as f64 {
            return Err(PrensaError::UnsupportedGeometry(format!(
                "mark of {}x{} pixels at {} dpi is too large",
                px_width, px_height, dpi
            )));
        }
        let (width, height) = (px_width as u32, px_height as u32);
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            PrensaError::Image(format!("cannot allocate {}x{} canvas", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        let scale = (dpi as f64 / MPT_PER_INCH) as f32;
        let transform = Transform::from_row(
            scale,
            0.0,
            0.0,
            scale,
            -(area.x as f32) * scale,
            -(area.y as f32) * scale,
        );
        Ok(Self {
            pixmap,
            transform,
            area,
        })
    }

    fn fill(&mut self, quad: &Quad, color: Color, mask: Option<&Mask>) {
        if let Some(path) = quad_path(quad) {
            self.pixmap.fill_path(
                &path,
                &paint_for(color),
                FillRule::Winding,
                self.transform,
                mask,
            );
        }
    }

    /// Mask letting through dashes along x (`horizontal`) or y.
    fn dash_mask(&self, horizontal: bool, on: f64, off: f64) -> Option<Mask> {
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
        let period = on + off;
        if period <= 0.0 {
            return None;
        }
        let (start, length) = if horizontal {
            (self.area.x, self.area.width)
        } else {
            (self.area.y, self.area.height)
        };
        let mut pos = start;
        while pos < start + length {
            let seg = if horizontal {
                Rect::new(pos, self.area.y, on, self.area.height)
            } else {
                Rect::new(self.area.x, pos, self.area.width, on)
            };
            let (tl, tr, br, bl) = corners(&seg);
            if let Some(path) = quad_path(&[tl, tr, br, bl]) {
                mask.fill_path(&path, FillRule::Winding, false, self.transform);
            }
            pos += period;
        }
        Some(mask)
    }

    /// Paint one band in the given style. `horizontal` is the direction the
    /// band runs in.
    fn band(&mut self, quad: &Quad, spec: &BorderSpec, horizontal: bool) {
        match spec.style {
            BorderStyle::None => {}
            BorderStyle::Solid => self.fill(quad, spec.color, None),
            BorderStyle::Double => {
                self.fill(&strip(quad, 0.0, 1.0 / 3.0), spec.color, None);
                self.fill(&strip(quad, 2.0 / 3.0, 1.0), spec.color, None);
            }
            BorderStyle::Dashed | BorderStyle::Dotted => {
                let (on, off) = if spec.style == BorderStyle::Dashed {
                    (spec.width * 3.0, spec.width * 2.0)
                } else {
                    (spec.width, spec.width)
                };
                let mask = self.dash_mask(horizontal, on, off);
                self.fill(quad, spec.color, mask.as_ref());
            }
        }
    }

    fn into_mark(self) -> MarkBitmap {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let data = self.pixmap.data();
        let image = GrayImage::from_fn(w, h, |x, y| {
            let i = (y as usize * w as usize + x as usize) * 4;
            let (r, g, b) = (data[i] as u32, data[i + 1] as u32, data[i + 2] as u32);
            image::Luma([((30 * r + 59 * g + 11 * b) / 100) as u8])
        });
        MarkBitmap {
            image,
            area: self.area,
        }
    }
}

/// Rasterize the mitered border of `rect` at `dpi`.
///
/// Returns `None` when no edge is visible.
pub fn rasterize(rect: Rect, borders: &BorderSet, dpi: u32) -> Result<Option<MarkBitmap>> {
    if borders.is_empty() {
        return Ok(None);
    }
    let area = outer_rect(rect, borders);
    if area.width <= 0.0 || area.height <= 0.0 {
        return Ok(None);
    }
    let mut canvas = Canvas::new(area, dpi)?;
    for (idx, edge) in edge_quads(rect, borders).iter().enumerate() {
        if let Some((quad, spec)) = edge {
            // before and after run horizontally
            canvas.band(quad, spec, idx % 2 == 0);
        }
    }
    Ok(Some(canvas.into_mark()))
}

/// Rasterize a rule at `dpi`.
pub fn rasterize_rule(rule: &Rule, dpi: u32) -> Result<Option<MarkBitmap>> {
    let area = rule.bounds();
    if area.is_empty() || rule.style == BorderStyle::None {
        return Ok(None);
    }
    let mut canvas = Canvas::new(area, dpi)?;
    let (tl, tr, br, bl) = corners(&area);
    let horizontal = rule.is_horizontal();
    // outer edge first so double rules split across the width
    let quad = if horizontal {
        [tl, tr, br, bl]
    } else {
        [tl, bl, br, tr]
    };
    let spec = BorderSpec::solid(rule.width, rule.color).with_style(rule.style);
    canvas.band(&quad, &spec, horizontal);
    Ok(Some(canvas.into_mark()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CollapseMode;

    fn solid(w: f64) -> BorderSpec {
        BorderSpec::solid(w, Color::BLACK)
    }

    #[test]
    fn test_fast_rects() {
        let rect = Rect::new(0.0, 0.0, 10000.0, 5000.0);
        let borders = BorderSet {
            before: Some(solid(100.0)),
            end: Some(solid(200.0)),
            after: None,
            start: Some(solid(0.0)),
        };
        let rects = fast_rects(rect, &borders);
        assert_eq!(
            rects,
            vec![
                (Rect::new(0.0, 0.0, 10000.0, 100.0), Color::BLACK),
                (Rect::new(9800.0, 0.0, 200.0, 5000.0), Color::BLACK),
            ]
        );
    }

    #[test]
    fn test_inner_and_outer() {
        let rect = Rect::new(1000.0, 1000.0, 10000.0, 10000.0);
        let borders = BorderSet {
            before: Some(solid(400.0).with_collapse(CollapseMode::CollapseOuter)),
            end: Some(solid(100.0)),
            after: None,
            start: None,
        };
        assert_eq!(
            outer_rect(rect, &borders),
            Rect::new(1000.0, 800.0, 10000.0, 10200.0)
        );
        assert_eq!(
            inner_rect(rect, &borders),
            Rect::new(1000.0, 1200.0, 9900.0, 9800.0)
        );
    }

    #[test]
    fn test_quads_meet_at_corners() {
        let rect = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        let quads = edge_quads(rect, &BorderSet::uniform(solid(100.0)));
        let (before, _) = quads[0].unwrap();
        let (end, _) = quads[1].unwrap();
        // the miter line from the outer to the inner top-right corner is shared
        assert_eq!(before[1], end[0]);
        assert_eq!(before[2], end[3]);
        assert_eq!(before[2], Point::new(900.0, 100.0));
    }

    #[test]
    fn test_empty_borders_rasterize_nothing() {
        let rect = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        assert!(rasterize(rect, &BorderSet::default(), 300).unwrap().is_none());
        assert!(fast_rects(rect, &BorderSet::default()).is_empty());
    }

    #[test]
    fn test_solid_border_bitmap() {
        // one inch square with a 1/10 inch border at 100 dpi
        let rect = Rect::new(0.0, 0.0, 72000.0, 72000.0);
        let mark = rasterize(rect, &BorderSet::uniform(solid(7200.0)), 100)
            .unwrap()
            .unwrap();
        assert_eq!(mark.image.dimensions(), (100, 100));
        assert_eq!(mark.image.get_pixel(50, 5).0[0], 0);
        assert_eq!(mark.image.get_pixel(5, 50).0[0], 0);
        assert_eq!(mark.image.get_pixel(50, 50).0[0], 255);
    }

    #[test]
    fn test_dotted_border_has_gaps() {
        let rect = Rect::new(0.0, 0.0, 72000.0, 72000.0);
        let spec = solid(7200.0).with_style(BorderStyle::Dotted);
        let borders = BorderSet {
            before: Some(spec),
            ..BorderSet::default()
        };
        let mark = rasterize(rect, &borders, 100).unwrap().unwrap();
        let row: Vec<u8> = (0..100).map(|x| mark.image.get_pixel(x, 5).0[0]).collect();
        assert!(row.contains(&0));
        assert!(row.contains(&255));
    }

    #[test]
    fn test_oversized_border_is_refused() {
        let rect = Rect::new(0.0, 0.0, 10_000_000.0, 10_000_000.0);
        let borders = BorderSet {
            start: Some(BorderSpec::solid(1000.0, Color::BLACK)),
            ..BorderSet::default()
        };
        let err = rasterize(rect, &borders, 600).unwrap_err();
        assert!(matches!(err, PrensaError::UnsupportedGeometry(_)));
    }

    #[test]
    fn test_double_rule() {
        let rule = Rule {
            start: Point::new(0.0, 3600.0),
            end: Point::new(72000.0, 3600.0),
            width: 7200.0,
            color: Color::BLACK,
            style: BorderStyle::Double,
        };
        let mark = rasterize_rule(&rule, 100).unwrap().unwrap();
        assert_eq!(mark.image.dimensions(), (100, 10));
        assert_eq!(mark.image.get_pixel(50, 0).0[0], 0);
        assert_eq!(mark.image.get_pixel(50, 5).0[0], 255);
        assert_eq!(mark.image.get_pixel(50, 9).0[0], 0);
    }
}
