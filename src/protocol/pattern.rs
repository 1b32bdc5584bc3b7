//! # User-Defined Patterns
//!
//! Gray fills are approximated with an 8x8 user-defined pattern built from a
//! Bayer threshold matrix. The pattern is downloaded with `ESC *c#W`:
//!
//! ```text
//! Offset  Size  Field
//! 0       1     format (0 = one bit per pixel)
//! 1       1     continuation (0)
//! 2       1     pixel encoding (1)
//! 3       1     reserved (0)
//! 4       2     height in dots, big-endian
//! 6       2     width in dots, big-endian
//! 8       8     pattern rows, one byte each
//! ```
//!
//! With a 4x4 matrix the 16 cells are replicated into all four quadrants of
//! the 8x8 tile, which gives a coarser but more stable screen on low
//! resolution devices.

use crate::error::{PrensaError, Result};
use crate::render::dither::{BAYER_D4, BAYER_D8};

/// Side of the downloaded pattern tile in dots.
pub const TILE_SIZE: u16 = 8;

/// Size of the matrix a gray pattern is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatrixSize {
    /// 4x4 matrix replicated to fill the tile.
    #[default]
    Four,
    /// Full 8x8 matrix.
    Eight,
}

impl MatrixSize {
    /// Parse a side length, rejecting anything but 4 and 8.
    pub fn from_side(side: u32) -> Result<Self> {
        match side {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(PrensaError::InvalidArgument(format!(
                "pattern matrix size must be 4 or 8, got {}",
                other
            ))),
        }
    }

    pub fn side(self) -> u32 {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }
}

/// The eight rows of a gray tile.
///
/// `gray` is luminance, 0 black to 255 white. A cell prints when its matrix
/// value is not below the gray level scaled to the matrix range.
pub fn gray_tile(gray: u8, size: MatrixSize) -> [u8; 8] {
    let mut rows = [0u8; 8];
    match size {
        MatrixSize::Eight => {
            let level = gray as i32 * 65 / 255;
            for (i, &cell) in BAYER_D8.iter().enumerate() {
                if (cell as i32) >= level - 1 {
                    rows[i / 8] |= 1 << (i % 8);
                }
            }
        }
        MatrixSize::Four => {
            let level = gray as i32 * 17 / 255;
            for (i, &cell) in BAYER_D4.iter().enumerate() {
                if (cell as i32) >= level - 1 {
                    let row = i / 4;
                    let bits = (1 << (i % 4)) | (1 << (i % 4 + 4));
                    rows[row] |= bits;
                    rows[row + 4] |= bits;
                }
            }
        }
    }
    rows
}

/// Complete pattern download payload (header and rows) for a gray level.
///
/// The payload length is always even.
pub fn gray_pattern(gray: u8, size: MatrixSize) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&[0, 0, 1, 0]);
    data.extend_from_slice(&TILE_SIZE.to_be_bytes());
    data.extend_from_slice(&TILE_SIZE.to_be_bytes());
    data.extend_from_slice(&gray_tile(gray, size));
    if data.len() % 2 == 1 {
        data.push(0);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let data = gray_pattern(128, MatrixSize::Eight);
        assert_eq!(&data[..8], &[0, 0, 1, 0, 0, 8, 0, 8]);
        assert_eq!(data.len(), 16);
    }

    #[test]
    fn test_black_and_white_tiles() {
        for size in [MatrixSize::Four, MatrixSize::Eight] {
            assert_eq!(gray_tile(0, size), [0xFF; 8]);
            assert_eq!(gray_tile(255, size), [0x00; 8]);
        }
    }

    #[test]
    fn test_darker_gray_has_more_dots() {
        for size in [MatrixSize::Four, MatrixSize::Eight] {
            let mut previous = u32::MAX;
            for gray in (0..=255u8).step_by(15) {
                let dots: u32 = gray_tile(gray, size).iter().map(|b| b.count_ones()).sum();
                assert!(dots <= previous, "gray {} has {} dots", gray, dots);
                previous = dots;
            }
        }
    }

    #[test]
    fn test_four_by_four_is_replicated() {
        let tile = gray_tile(100, MatrixSize::Four);
        for row in 0..4 {
            assert_eq!(tile[row], tile[row + 4]);
            assert_eq!(tile[row] & 0x0F, tile[row] >> 4);
        }
    }

    #[test]
    fn test_matrix_size_from_side() {
        assert_eq!(MatrixSize::from_side(4).unwrap(), MatrixSize::Four);
        assert_eq!(MatrixSize::from_side(8).unwrap().side(), 8);
        assert!(MatrixSize::from_side(2).is_err());
    }
}
