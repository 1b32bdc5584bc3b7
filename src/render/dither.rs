//! # Bayer Ordered Dithering
//!
//! Converts grayscale to black/white dots for a device that cannot print gray.
//! Varying the density of black dots gives the illusion of gray levels:
//!
//! ```text
//! Grayscale:    White    Light    Medium    Dark    Black
//!               ░░░░░░   ░░▒░░░   ░▒░▒░▒   ▒▓▒▓▒▓   ██████
//! ```
//!
//! ## Matrix Derivation
//!
//! The threshold matrices are derived recursively from the 2x2 base
//! `[0 2; 3 1]`. Each derivation doubles the side: every cell value `v` of the
//! previous matrix becomes `4v + base[q]` in quadrant `q` (top-left, top-right,
//! bottom-left, bottom-right):
//!
//! ```text
//!   D2          D4
//! ┌───┬───┐   ┌────┬────┬────┬────┐
//! │ 0 │ 2 │   │  0 │  8 │  2 │ 10 │
//! ├───┼───┤   │ 12 │  4 │ 14 │  6 │
//! │ 3 │ 1 │   │  3 │ 11 │  1 │  9 │
//! └───┴───┘   │ 15 │  7 │ 13 │  5 │
//!             └────┴────┴────┴────┘
//! ```
//!
//! D8 is derived from D4 the same way and holds every value 0-63 exactly once:
//!
//! ```text
//!     0   1   2   3   4   5   6   7   (x mod 8)
//!   ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! 0 │ 0 │32 │ 8 │40 │ 2 │34 │10 │42 │
//! 1 │48 │16 │56 │24 │50 │18 │58 │26 │
//! 2 │12 │44 │ 4 │36 │14 │46 │ 6 │38 │
//! 3 │60 │28 │52 │20 │62 │30 │54 │22 │
//! 4 │ 3 │35 │11 │43 │ 1 │33 │ 9 │41 │
//! 5 │51 │19 │59 │27 │49 │17 │57 │25 │
//! 6 │15 │47 │ 7 │39 │13 │45 │ 5 │37 │
//! 7 │63 │31 │55 │23 │61 │29 │53 │21 │
//!   └───┴───┴───┴───┴───┴───┴───┴───┘
//! (y mod 8)
//! ```
//!
//! Values are normalized to thresholds in (0, 1) with
//! `threshold = (value + 0.5) / 64.0`, so black always prints and white never does.
//!
//! ## Usage Example
//!
//! ```
//! use prensa::render::dither;
//!
//! // For a pixel at (10, 20) with 50% gray (0.5 intensity)
//! let should_print = dither::should_print(10, 20, 0.5);
//!
//! // Pack a row of boolean values into bytes
//! let row: Vec<bool> = vec![true, true, false, false, true, false, true, false];
//! let packed = dither::pack_row(&row);
//! assert_eq!(packed, vec![0b11001010]); // 0xCA
//! ```

use image::GrayImage;

use super::bitmap::MonochromeBitmap;
use crate::error::{PrensaError, Result};

/// The 2x2 base matrix, row-major.
pub const BAYER_D2: [u8; 4] = [0, 2, 3, 1];

/// 4x4 matrix, derived once from [`BAYER_D2`].
pub const BAYER_D4: [u8; 16] = [
    0, 8, 2, 10, //
    12, 4, 14, 6, //
    3, 11, 1, 9, //
    15, 7, 13, 5,
];

/// 8x8 matrix, derived twice from [`BAYER_D2`].
pub const BAYER_D8: [u8; 64] = [
    0, 32, 8, 40, 2, 34, 10, 42, //
    48, 16, 56, 24, 50, 18, 58, 26, //
    12, 44, 4, 36, 14, 46, 6, 38, //
    60, 28, 52, 20, 62, 30, 54, 22, //
    3, 35, 11, 43, 1, 33, 9, 41, //
    51, 19, 59, 27, 49, 17, 57, 25, //
    15, 47, 7, 39, 13, 45, 5, 37, //
    63, 31, 55, 23, 61, 29, 53, 21,
];

/// Derive the next larger Bayer matrix from a square row-major matrix.
///
/// The result has twice the side length and four times as many cells.
pub fn derive_bayer(matrix: &[u8]) -> Vec<u8> {
    let half = matrix.len().isqrt();
    let side = half * 2;
    let mut out = vec![0u8; side * side];
    for (idx, &value) in matrix.iter().enumerate() {
        for (part, &offset) in BAYER_D2.iter().enumerate() {
            let x_offset = (part & 1) * half;
            let y_offset = (part >> 1) * half * side;
            let cell = y_offset + (idx / half) * side + idx % half + x_offset;
            out[cell] = value * 4 + offset;
        }
    }
    out
}

/// Bayer matrix of the given side (2, 4 or 8), derived from the base matrix.
pub fn bayer_matrix(side: usize) -> Result<Vec<u8>> {
    match side {
        2 => Ok(BAYER_D2.to_vec()),
        4 => Ok(derive_bayer(&BAYER_D2)),
        8 => Ok(derive_bayer(&derive_bayer(&BAYER_D2))),
        other => Err(PrensaError::InvalidArgument(format!(
            "dither matrix side must be 2, 4 or 8, got {}",
            other
        ))),
    }
}

/// Get the dithering threshold for a pixel position.
///
/// Returns a value in (0.0078125, 0.9921875), never exactly 0 or 1.
///
/// ```text
/// matrix_value = BAYER_D8[(y mod 8) * 8 + (x mod 8)]
/// threshold = (matrix_value + 0.5) / 64.0
/// ```
#[inline]
pub fn threshold(x: usize, y: usize) -> f32 {
    let matrix_value = BAYER_D8[(y & 7) * 8 + (x & 7)];
    (matrix_value as f32 + 0.5) / 64.0
}

/// Determine if a dot should be printed at the given position.
///
/// `intensity` is 0.0 for white and 1.0 for black.
///
/// ```
/// use prensa::render::dither::should_print;
///
/// assert!(should_print(0, 0, 1.0));
/// assert!(!should_print(0, 0, 0.0));
/// ```
#[inline]
pub fn should_print(x: usize, y: usize, intensity: f32) -> bool {
    intensity > threshold(x, y)
}

/// Pack a row of boolean pixel values into bytes.
///
/// - Bit 7 (MSB) = leftmost pixel
/// - 1 = black (print dot), 0 = white (no dot)
/// - The last byte is padded with white on the right
///
/// ```
/// use prensa::render::dither::pack_row;
///
/// let row = vec![true, true, true, true, false, false, false, false];
/// assert_eq!(pack_row(&row), vec![0xF0]);
///
/// let row = vec![true; 12];
/// assert_eq!(pack_row(&row), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            let byte_idx = i / 8;
            let bit_idx = 7 - (i % 8); // MSB first
            bytes[byte_idx] |= 1 << bit_idx;
        }
    }

    bytes
}

/// Ink intensity of an 8-bit luma value: 0.0 for white, 1.0 for black.
#[inline]
pub fn intensity(luma: u8) -> f32 {
    1.0 - luma as f32 / 255.0
}

/// Ordered-dither a grayscale image with the 8x8 matrix.
pub fn ordered(gray: &GrayImage) -> MonochromeBitmap {
    MonochromeBitmap::from_fn(gray.width(), gray.height(), |x, y| {
        should_print(x as usize, y as usize, intensity(gray.get_pixel(x, y).0[0]))
    })
}

/// Hard threshold: anything darker than mid gray becomes black.
pub fn threshold_image(gray: &GrayImage) -> MonochromeBitmap {
    MonochromeBitmap::from_fn(gray.width(), gray.height(), |x, y| {
        gray.get_pixel(x, y).0[0] < 128
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn assert_permutation(matrix: &[u8]) {
        let mut seen = vec![false; matrix.len()];
        for &val in matrix {
            assert!((val as usize) < matrix.len(), "Matrix value {} out of range", val);
            assert!(!seen[val as usize], "Duplicate value {}", val);
            seen[val as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "Not all values present");
    }

    #[test]
    fn test_derivation_matches_tables() {
        assert_eq!(bayer_matrix(4).unwrap(), BAYER_D4.to_vec());
        assert_eq!(bayer_matrix(8).unwrap(), BAYER_D8.to_vec());
    }

    #[test]
    fn test_derived_matrices_are_complete() {
        assert_permutation(&bayer_matrix(2).unwrap());
        assert_permutation(&bayer_matrix(4).unwrap());
        assert_permutation(&bayer_matrix(8).unwrap());
    }

    #[test]
    fn test_invalid_matrix_size() {
        assert!(matches!(
            bayer_matrix(3),
            Err(PrensaError::InvalidArgument(_))
        ));
        assert!(bayer_matrix(16).is_err());
    }

    #[test]
    fn test_threshold_range() {
        for y in 0..8 {
            for x in 0..8 {
                let t = threshold(x, y);
                assert!(t > 0.0 && t < 1.0, "Threshold at ({},{}) out of range", x, y);
            }
        }
    }

    #[test]
    fn test_threshold_periodicity() {
        for y in 0..8 {
            for x in 0..8 {
                let t1 = threshold(x, y);
                assert_eq!(t1, threshold(x + 8, y));
                assert_eq!(t1, threshold(x, y + 8));
                assert_eq!(t1, threshold(x + 8, y + 8));
            }
        }
    }

    #[test]
    fn test_black_always_prints_white_never() {
        for y in 0..32 {
            for x in 0..32 {
                assert!(should_print(x, y, 1.0));
                assert!(!should_print(x, y, 0.0));
            }
        }
    }

    #[test]
    fn test_gray_distribution() {
        let count = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| should_print(x, y, 0.5))
            .count();
        assert_eq!(count, 32);
    }

    #[test]
    fn test_pack_row() {
        assert_eq!(pack_row(&[true; 8]), vec![0xFF]);
        assert_eq!(pack_row(&[false; 8]), vec![0x00]);
        assert_eq!(
            pack_row(&[true, false, true, false, true, false, true, false]),
            vec![0xAA]
        );
        assert_eq!(pack_row(&[true; 9]), vec![0xFF, 0x80]);
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_ordered_image() {
        let black = GrayImage::from_pixel(16, 2, Luma([0]));
        assert_eq!(ordered(&black).black_count(), 32);
        let white = GrayImage::from_pixel(16, 2, Luma([255]));
        assert_eq!(ordered(&white).black_count(), 0);
        let gray = GrayImage::from_pixel(8, 8, Luma([128]));
        let dots = ordered(&gray).black_count();
        assert!((28..=36).contains(&dots), "got {} dots", dots);
    }

    #[test]
    fn test_threshold_image() {
        let img = GrayImage::from_fn(8, 1, |x, _| Luma([if x < 4 { 10 } else { 200 }]));
        let bitmap = threshold_image(&img);
        assert_eq!(bitmap.row(0), &[0xF0]);
    }
}
