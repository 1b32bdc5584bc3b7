//! # Numeric Parameter Formatting
//!
//! PCL numeric parameters are ASCII decimals with an optional fraction:
//!
//! ```text
//! ESC & a 1234.56 h 789 V
//!         ^^^^^^^   ^^^
//!         at most two fraction digits for coordinates
//! ```
//!
//! Coordinates carry at most two fraction digits, fine scale factors (rectangle
//! sizes, VMI, HP-GL/2 scaling) carry four. Trailing zeros are dropped, the
//! separator is always `.`, and rounding is half-to-even on the exact binary
//! value of the `f64`, so `0.125` becomes `0.12` but `0.135` (stored as
//! `0.13500000000000000888...`) becomes `0.14`.

/// Extra digits requested from the float formatter beyond the kept ones.
///
/// Enough to see whether a value sitting on a decimal tie is really on it.
const GUARD_DIGITS: usize = 24;

/// A fixed "0.##"-style decimal formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalFormat {
    max_fraction_digits: usize,
}

impl DecimalFormat {
    /// Two fraction digits, used for cursor coordinates and font sizes.
    pub const COORDINATE: Self = Self::new(2);

    /// Four fraction digits, used for rectangle sizes and scale factors.
    pub const FINE: Self = Self::new(4);

    pub const fn new(max_fraction_digits: usize) -> Self {
        Self {
            max_fraction_digits,
        }
    }

    pub fn max_fraction_digits(&self) -> usize {
        self.max_fraction_digits
    }

    /// Format a value.
    ///
    /// Non-finite input formats as `0`; a value that rounds to zero never
    /// carries a sign.
    ///
    /// ```
    /// use prensa::protocol::format::DecimalFormat;
    ///
    /// assert_eq!(DecimalFormat::COORDINATE.format(12.0), "12");
    /// assert_eq!(DecimalFormat::COORDINATE.format(0.125), "0.12");
    /// assert_eq!(DecimalFormat::FINE.format(-3.14159), "-3.1416");
    /// ```
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return "0".to_string();
        }
        let keep = self.max_fraction_digits;
        let expanded = format!("{:.*}", keep + GUARD_DIGITS, value.abs());
        let (int_part, frac_part) = expanded.split_once('.').unwrap_or((&expanded, ""));

        let mut digits: Vec<u8> = int_part
            .bytes()
            .chain(frac_part.bytes().take(keep))
            .map(|b| b - b'0')
            .collect();
        let guard = frac_part.as_bytes().get(keep..).unwrap_or(&[]);

        if round_up(&digits, guard) {
            increment(&mut digits);
        }

        let int_len = digits.len() - keep;
        let mut out = String::with_capacity(digits.len() + 2);
        if value < 0.0 && digits.iter().any(|&d| d != 0) {
            out.push('-');
        }
        for &d in &digits[..int_len] {
            out.push((b'0' + d) as char);
        }
        let frac = &digits[int_len..];
        let significant = frac.iter().rposition(|&d| d != 0).map_or(0, |i| i + 1);
        if significant > 0 {
            out.push('.');
            for &d in &frac[..significant] {
                out.push((b'0' + d) as char);
            }
        }
        out
    }
}

/// Half-to-even decision given the kept digits and the discarded tail.
fn round_up(kept: &[u8], tail: &[u8]) -> bool {
    match tail.first() {
        Some(b'6'..=b'9') => true,
        Some(b'5') => {
            let beyond_tie = tail[1..].iter().any(|&b| b != b'0');
            let last_odd = kept.last().is_some_and(|d| d % 2 == 1);
            beyond_tie || last_odd
        }
        _ => false,
    }
}

/// Add one unit in the last place, growing the integer part on overflow.
fn increment(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, 1);
}

/// The pair of formatters a [`PclWriter`](super::writer::PclWriter) uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatters {
    pub coordinate: DecimalFormat,
    pub fine: DecimalFormat,
}

impl Formatters {
    /// The protocol-mandated formatting.
    pub const fn pcl() -> Self {
        Self {
            coordinate: DecimalFormat::COORDINATE,
            fine: DecimalFormat::FINE,
        }
    }
}

impl Default for Formatters {
    fn default() -> Self {
        Self::pcl()
    }
}
