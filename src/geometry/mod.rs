//! # Page Geometry
//!
//! All logical coordinates are in millipoints (1/72000 inch) with the origin at
//! the top-left of the page and y growing downwards.
//!
//! PCL has no affine transform. The only rotation the device knows is the
//! print direction, a quarter turn of its coordinate system, so every
//! transform reaching the device has to be one of:
//!
//! ```text
//!    0°          90°          180°          270°
//! [ sx  0 ]   [  0  sy ]   [ -sx  0  ]   [  0  -sy ]
//! [ 0  sy ]   [ -sx  0 ]   [  0  -sy ]   [  sx  0  ]
//! ```
//!
//! with positive scale factors. Anything else is rejected as
//! [`UnsupportedGeometry`](crate::error::PrensaError::UnsupportedGeometry).

pub mod stack;

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::error::{PrensaError, Result};

pub use stack::{GraphicsSnapshot, TransformStack};

/// Millipoints per inch.
pub const MPT_PER_INCH: f64 = 72000.0;

/// Millipoints per decipoint, the PCL cursor unit.
pub const MPT_PER_DECIPOINT: f64 = 100.0;

/// Tolerance for classifying matrix entries as 0 or as a sign.
const EPSILON: f64 = 1e-9;

/// Millipoints to device pixels at `dpi`.
#[inline]
pub fn mpt_to_px(mpt: f64, dpi: u32) -> f64 {
    mpt * dpi as f64 / MPT_PER_INCH
}

/// Inches to millipoints, rounded to whole millipoints.
#[inline]
pub fn inch_to_mpt(inches: f64) -> f64 {
    (inches * MPT_PER_INCH).round()
}

/// Millimetres to millipoints, rounded to whole millipoints.
#[inline]
pub fn mm_to_mpt(mm: f64) -> f64 {
    (mm * MPT_PER_INCH / 25.4).round()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, origin at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Shrink by per-side amounts (top, right, bottom, left).
    pub fn inset(&self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self::new(
            self.x + left,
            self.y + top,
            self.width - left - right,
            self.height - top - bottom,
        )
    }

    /// Grow by per-side amounts (top, right, bottom, left).
    pub fn outset(&self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        self.inset(-top, -right, -bottom, -left)
    }
}

/// 2-D affine transform.
///
/// Maps `(x, y)` to `(a·x + c·y + e, b·x + d·y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `radians`.
    pub fn rotate(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Exact quarter-turn rotation for a print direction.
    ///
    /// `quarter_turn(PrintDirection::Deg90)` produces the matrix classified as
    /// 90°, and composing it four times returns to the identity.
    pub const fn quarter_turn(direction: PrintDirection) -> Self {
        match direction {
            PrintDirection::Deg0 => Self::IDENTITY,
            PrintDirection::Deg90 => Self::new(0.0, -1.0, 1.0, 0.0, 0.0, 0.0),
            PrintDirection::Deg180 => Self::new(-1.0, 0.0, 0.0, -1.0, 0.0, 0.0),
            PrintDirection::Deg270 => Self::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0),
        }
    }

    /// `self` applied after `other`.
    pub fn then(&self, other: &Self) -> Self {
        *other * *self
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Length of the transformed unit vectors along x and y.
    pub fn scale_factors(&self) -> (f64, f64) {
        (self.a.hypot(self.b), self.c.hypot(self.d))
    }
}

impl Mul for Affine {
    type Output = Affine;

    /// Concatenation: `(m * n).apply(p) == m.apply(n.apply(p))`.
    fn mul(self, n: Affine) -> Affine {
        let m = self;
        Affine::new(
            m.a * n.a + m.c * n.b,
            m.b * n.a + m.d * n.b,
            m.a * n.c + m.c * n.d,
            m.b * n.c + m.d * n.d,
            m.a * n.e + m.c * n.f + m.e,
            m.b * n.e + m.d * n.f + m.f,
        )
    }
}

/// Rotation of the device coordinate system (`ESC &a#P`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrintDirection {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl PrintDirection {
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Classify the linear part of a transform.
    ///
    /// ```
    /// use prensa::geometry::{Affine, PrintDirection};
    ///
    /// assert_eq!(PrintDirection::classify(&Affine::scale(2.0, 2.0)).unwrap(), PrintDirection::Deg0);
    /// assert!(PrintDirection::classify(&Affine::rotate(0.3)).is_err());
    /// ```
    pub fn classify(t: &Affine) -> Result<Self> {
        let zero = |v: f64| v.abs() < EPSILON;
        let pos = |v: f64| v > EPSILON;
        let neg = |v: f64| v < -EPSILON;

        if zero(t.b) && zero(t.c) {
            if pos(t.a) && pos(t.d) {
                return Ok(Self::Deg0);
            }
            if neg(t.a) && neg(t.d) {
                return Ok(Self::Deg180);
            }
        } else if zero(t.a) && zero(t.d) {
            if pos(t.c) && neg(t.b) {
                return Ok(Self::Deg90);
            }
            if neg(t.c) && pos(t.b) {
                return Ok(Self::Deg270);
            }
        }
        Err(PrensaError::UnsupportedGeometry(format!(
            "transform [{} {} {} {}] is not a quarter turn with positive scaling",
            t.a, t.b, t.c, t.d
        )))
    }
}
