//! Nested transforms and the print direction derived from them.

use super::{Affine, Point, PrintDirection};
use crate::error::Result;
use crate::printer::media::PageFrame;

/// Vertical correction applied in the 180° projection, half an inch.
///
/// The device's default text length is half an inch less than the logical
/// page, which shifts the rotated origin by that much.
pub const DIRECTION_180_Y_CORRECTION: f64 = 36000.0;

/// Graphics state of one nesting level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsSnapshot {
    transform: Affine,
    direction: PrintDirection,
}

impl GraphicsSnapshot {
    fn new(transform: Affine) -> Result<Self> {
        let direction = PrintDirection::classify(&transform)?;
        Ok(Self {
            transform,
            direction,
        })
    }

    /// Composed transform from this level to page coordinates.
    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    pub fn direction(&self) -> PrintDirection {
        self.direction
    }
}

impl Default for GraphicsSnapshot {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            direction: PrintDirection::Deg0,
        }
    }
}

/// Stack of graphics snapshots. The bottom entry is the page itself and is
/// never popped.
#[derive(Debug, Clone)]
pub struct TransformStack {
    snapshots: Vec<GraphicsSnapshot>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            snapshots: vec![GraphicsSnapshot::default()],
        }
    }

    pub fn current(&self) -> &GraphicsSnapshot {
        // the base entry is never removed
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn direction(&self) -> PrintDirection {
        self.current().direction
    }

    /// Number of pushed levels above the page.
    pub fn depth(&self) -> usize {
        self.snapshots.len() - 1
    }

    /// Compose `transform` onto the current level and enter the result.
    ///
    /// On an unsupported composition the stack is left untouched.
    pub fn push(&mut self, transform: &Affine) -> Result<PrintDirection> {
        let composed = self.current().transform * *transform;
        let snapshot = GraphicsSnapshot::new(composed)?;
        self.snapshots.push(snapshot);
        Ok(snapshot.direction)
    }

    /// Leave the current level. Returns `None` at page level.
    pub fn pop(&mut self) -> Option<GraphicsSnapshot> {
        if self.snapshots.len() > 1 {
            self.snapshots.pop()
        } else {
            None
        }
    }

    /// Drop every pushed level.
    pub fn reset(&mut self) {
        self.snapshots.truncate(1);
    }

    /// Map a logical point to absolute device coordinates (millipoints) for
    /// the current print direction.
    pub fn to_device(&self, p: Point, frame: &PageFrame) -> Point {
        project(self.current().transform.apply(p), self.direction(), frame)
    }

    /// Device size of a logical extent at the current level.
    pub fn to_device_size(&self, width: f64, height: f64) -> (f64, f64) {
        let (sx, sy) = self.current().transform.scale_factors();
        (width * sx, height * sy)
    }
}

/// Project a page point into the device coordinate system of `direction`.
pub fn project(p: Point, direction: PrintDirection, frame: &PageFrame) -> Point {
    let page = frame.physical_size();
    let log = frame.logical_rect();
    match direction {
        PrintDirection::Deg0 => Point::new(p.x - log.x, p.y - log.y),
        PrintDirection::Deg90 => {
            let x = page.height - p.y;
            let y = p.x;
            Point::new(x - log.y, y - log.x)
        }
        PrintDirection::Deg180 => {
            let x = page.width - p.x;
            let y = page.height - p.y;
            Point::new(
                x - (page.width - log.x - log.width),
                y - (page.height - log.y - log.height) - DIRECTION_180_Y_CORRECTION,
            )
        }
        PrintDirection::Deg270 => {
            let x = p.y;
            let y = page.width - p.x;
            Point::new(
                x - (page.height - log.y - log.height),
                y - (page.width - log.x - log.width),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::media::PageFrameRegistry;

    fn a4() -> PageFrame {
        PageFrameRegistry::builtin()
            .lookup(595276.0, 841890.0)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_push_pop_restores() {
        let mut stack = TransformStack::new();
        assert_eq!(stack.depth(), 0);
        stack.push(&Affine::translate(100.0, 200.0)).unwrap();
        let dir = stack
            .push(&Affine::quarter_turn(PrintDirection::Deg90))
            .unwrap();
        assert_eq!(dir, PrintDirection::Deg90);
        assert_eq!(stack.depth(), 2);
        stack.pop();
        assert_eq!(stack.direction(), PrintDirection::Deg0);
        assert_eq!(*stack.current().transform(), Affine::translate(100.0, 200.0));
        stack.pop();
        assert!(stack.pop().is_none());
        assert_eq!(*stack.current().transform(), Affine::IDENTITY);
    }

    #[test]
    fn test_rejected_push_leaves_stack_unchanged() {
        let mut stack = TransformStack::new();
        stack.push(&Affine::translate(5.0, 5.0)).unwrap();
        let before = *stack.current();
        assert!(stack.push(&Affine::rotate(0.5)).is_err());
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.current(), before);
    }

    #[test]
    fn test_projection_0() {
        let frame = a4();
        let stack = TransformStack::new();
        let p = stack.to_device(Point::new(100000.0, 50000.0), &frame);
        // A4 portrait logical page starts 71/300 inch in
        assert_eq!(p, Point::new(100000.0 - 71.0 * 240.0, 50000.0));
    }

    #[test]
    fn test_projection_90() {
        let frame = a4();
        let mut stack = TransformStack::new();
        stack
            .push(&Affine::quarter_turn(PrintDirection::Deg90))
            .unwrap();
        let p = stack.to_device(Point::new(0.0, -1000.0), &frame);
        // transformed point is (-1000, 0)
        assert_eq!(p, Point::new(841890.0 - 0.0, -1000.0 - 71.0 * 240.0));
    }

    #[test]
    fn test_projection_180_has_correction() {
        let frame = a4();
        let page = frame.physical_size();
        let log = frame.logical_rect();
        let p = project(Point::new(0.0, 0.0), PrintDirection::Deg180, &frame);
        assert_eq!(p.x, page.width - (page.width - log.x - log.width));
        assert_eq!(
            p.y,
            page.height - (page.height - log.y - log.height) - DIRECTION_180_Y_CORRECTION
        );
    }

    #[test]
    fn test_projection_270() {
        let frame = a4();
        let page = frame.physical_size();
        let log = frame.logical_rect();
        let p = project(Point::new(1000.0, 2000.0), PrintDirection::Deg270, &frame);
        assert_eq!(p.x, 2000.0 - (page.height - log.y - log.height));
        assert_eq!(p.y, page.width - 1000.0 - (page.width - log.x - log.width));
    }

    #[test]
    fn test_device_size_scales() {
        let mut stack = TransformStack::new();
        stack.push(&Affine::scale(2.0, 0.5)).unwrap();
        assert_eq!(stack.to_device_size(100.0, 100.0), (200.0, 50.0));
    }
}
