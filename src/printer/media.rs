//! # Page Frames
//!
//! Maps a physical page size onto a media definition the printer knows.
//!
//! ## Built-in Media
//!
//! Logical page rectangles are the printable areas PCL 5 printers use,
//! given in 1/300 inch (`x, y, width, height`):
//!
//! | Name      | Selector | Size          | Portrait logical   | Landscape logical  |
//! |-----------|----------|---------------|--------------------|--------------------|
//! | Letter    | 2        | 8.5 x 11 in   | 75, 0, 2400, 3300  | 60, 0, 3180, 2550  |
//! | Legal     | 3        | 8.5 x 14 in   | 75, 0, 2400, 4200  | 60, 0, 4080, 2550  |
//! | Executive | 1        | 7.25 x 10.5 in| 75, 0, 2025, 3150  | 60, 0, 3030, 2175  |
//! | Ledger    | 6        | 11 x 17 in    | 75, 0, 3150, 5100  | 60, 0, 4980, 3300  |
//! | A5        | 25       | 148 x 210 mm  | 71, 0, 1745, 2480  | 59, 0, 2362, 1747  |
//! | A4        | 26       | 210 x 297 mm  | 71, 0, 2338, 3507  | 59, 0, 3389, 2480  |
//! | A3        | 27       | 297 x 420 mm  | 71, 0, 3365, 4960  | 59, 0, 4842, 3507  |
//!
//! A requested size matches a definition when both dimensions are within the
//! tolerance (1000 millipoints). Unknown sizes fall back to Letter with a
//! warning.

use tracing::warn;

use crate::geometry::{Rect, Size, inch_to_mpt, mm_to_mpt};

/// Match tolerance in millipoints.
pub const DEFAULT_TOLERANCE: f64 = 1000.0;

/// Millipoints per 1/300 inch.
const MPT_PER_DOT_300: f64 = 240.0;

/// A resolved media definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFrame {
    name: String,
    selector: u16,
    physical_size: Size,
    logical_rect: Rect,
    landscape: bool,
}

impl PageFrame {
    pub fn new(
        name: impl Into<String>,
        selector: u16,
        physical_size: Size,
        logical_rect: Rect,
        landscape: bool,
    ) -> Self {
        Self {
            name: name.into(),
            selector,
            physical_size,
            logical_rect,
            landscape,
        }
    }

    fn inches(name: &str, selector: u16, w: f64, h: f64, log: [u32; 4], landscape: bool) -> Self {
        Self::new(
            name,
            selector,
            Size::new(inch_to_mpt(w), inch_to_mpt(h)),
            logical_rect(log),
            landscape,
        )
    }

    fn millimetres(name: &str, selector: u16, w: f64, h: f64, log: [u32; 4], landscape: bool) -> Self {
        Self::new(
            name,
            selector,
            Size::new(mm_to_mpt(w), mm_to_mpt(h)),
            logical_rect(log),
            landscape,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// PCL media code for `ESC &l#A`.
    pub fn selector(&self) -> u16 {
        self.selector
    }

    /// Physical page size in millipoints.
    pub fn physical_size(&self) -> Size {
        self.physical_size
    }

    /// Printable area in millipoints, relative to the physical page.
    pub fn logical_rect(&self) -> Rect {
        self.logical_rect
    }

    pub fn is_landscape(&self) -> bool {
        self.landscape
    }

    /// Whether a page of `width` x `height` millipoints matches this definition.
    pub fn matches(&self, width: f64, height: f64, tolerance: f64) -> bool {
        (self.physical_size.width - width).abs() < tolerance
            && (self.physical_size.height - height).abs() < tolerance
    }
}

fn logical_rect([x, y, w, h]: [u32; 4]) -> Rect {
    Rect::new(
        x as f64 * MPT_PER_DOT_300,
        y as f64 * MPT_PER_DOT_300,
        w as f64 * MPT_PER_DOT_300,
        h as f64 * MPT_PER_DOT_300,
    )
}

/// Result of resolving a page size.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSelection {
    pub frame: PageFrame,
    /// `true` when no definition matched and the fallback was used.
    pub fallback: bool,
}

/// Ordered list of media definitions with a fallback entry.
#[derive(Debug, Clone)]
pub struct PageFrameRegistry {
    frames: Vec<PageFrame>,
    fallback: usize,
    tolerance: f64,
}

impl Default for PageFrameRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PageFrameRegistry {
    /// The built-in media table, falling back to portrait Letter.
    pub fn builtin() -> Self {
        let frames = vec![
            PageFrame::inches("Letter", 2, 8.5, 11.0, [75, 0, 2400, 3300], false),
            PageFrame::inches("Legal", 3, 8.5, 14.0, [75, 0, 2400, 4200], false),
            PageFrame::inches("Executive", 1, 7.25, 10.5, [75, 0, 2025, 3150], false),
            PageFrame::inches("Ledger", 6, 11.0, 17.0, [75, 0, 3150, 5100], false),
            PageFrame::millimetres("A5", 25, 148.0, 210.0, [71, 0, 1745, 2480], false),
            PageFrame::millimetres("A4", 26, 210.0, 297.0, [71, 0, 2338, 3507], false),
            PageFrame::millimetres("A3", 27, 297.0, 420.0, [71, 0, 3365, 4960], false),
            PageFrame::inches("LetterL", 2, 11.0, 8.5, [60, 0, 3180, 2550], true),
            PageFrame::inches("LegalL", 3, 14.0, 8.5, [60, 0, 4080, 2550], true),
            PageFrame::inches("ExecutiveL", 1, 10.5, 7.25, [60, 0, 3030, 2175], true),
            PageFrame::inches("LedgerL", 6, 17.0, 11.0, [60, 0, 4980, 3300], true),
            PageFrame::millimetres("A5L", 25, 210.0, 148.0, [59, 0, 2362, 1747], true),
            PageFrame::millimetres("A4L", 26, 297.0, 210.0, [59, 0, 3389, 2480], true),
            PageFrame::millimetres("A3L", 27, 420.0, 297.0, [59, 0, 4842, 3507], true),
        ];
        Self {
            frames,
            fallback: 0,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// A custom registry. `fallback` indexes into `frames`.
    pub fn with_frames(frames: Vec<PageFrame>, fallback: usize) -> Option<Self> {
        (fallback < frames.len()).then_some(Self {
            frames,
            fallback,
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn frames(&self) -> &[PageFrame] {
        &self.frames
    }

    pub fn fallback_frame(&self) -> &PageFrame {
        &self.frames[self.fallback]
    }

    pub fn by_name(&self, name: &str) -> Option<&PageFrame> {
        self.frames.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// First definition matching the size, in table order.
    pub fn lookup(&self, width: f64, height: f64) -> Option<&PageFrame> {
        self.frames
            .iter()
            .find(|f| f.matches(width, height, self.tolerance))
    }

    /// Resolve a page size, falling back to the default definition.
    pub fn select(&self, width: f64, height: f64) -> FrameSelection {
        match self.lookup(width, height) {
            Some(frame) => FrameSelection {
                frame: frame.clone(),
                fallback: false,
            },
            None => {
                let frame = self.fallback_frame().clone();
                warn!(
                    width,
                    height,
                    fallback = frame.name(),
                    "paper type could not be determined, using fallback"
                );
                FrameSelection {
                    frame,
                    fallback: true,
                }
            }
        }
    }
}
