//! One-bit-per-pixel bitmaps, the only raster form ever sent to the printer.

use super::dither::pack_row;
use crate::error::{PrensaError, Result};

/// A packed monochrome bitmap.
///
/// Rows are stored top to bottom, `ceil(width / 8)` bytes each, MSB is the
/// leftmost pixel and a set bit is black. Padding bits at the end of each row
/// are always white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeBitmap {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl MonochromeBitmap {
    /// An all-white bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            stride,
            data: vec![0; stride * height as usize],
        }
    }

    /// Wrap already packed rows.
    pub fn from_packed(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let stride = (width as usize).div_ceil(8);
        if data.len() != stride * height as usize {
            return Err(PrensaError::InvalidArgument(format!(
                "packed bitmap {}x{} needs {} bytes, got {}",
                width,
                height,
                stride * height as usize,
                data.len()
            )));
        }
        let mut bitmap = Self {
            width,
            height,
            stride,
            data,
        };
        bitmap.clear_padding();
        Ok(bitmap)
    }

    /// Build a bitmap from a predicate returning `true` for black pixels.
    pub fn from_fn(width: u32, height: u32, black: impl Fn(u32, u32) -> bool) -> Self {
        let stride = (width as usize).div_ceil(8);
        let mut data = Vec::with_capacity(stride * height as usize);
        let mut row = Vec::with_capacity(width as usize);
        for y in 0..height {
            row.clear();
            row.extend((0..width).map(|x| black(x, y)));
            data.extend(pack_row(&row));
        }
        Self {
            width,
            height,
            stride,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Packed bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Iterate over packed rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact panics on zero, and a zero-width bitmap has no rows worth sending
        self.data.chunks_exact(self.stride.max(1))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        let byte = self.data[y as usize * self.stride + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    pub fn set(&mut self, x: u32, y: u32, black: bool) {
        let idx = y as usize * self.stride + x as usize / 8;
        let mask = 0x80 >> (x % 8);
        if black {
            self.data[idx] |= mask;
        } else {
            self.data[idx] &= !mask;
        }
    }

    /// Count of black pixels.
    pub fn black_count(&self) -> u32 {
        self.data.iter().map(|b| b.count_ones()).sum()
    }

    /// Nearest-neighbour resample to a new size.
    pub fn scaled(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.is_empty() {
            return Self::new(width, height);
        }
        let (sw, sh) = (self.width as u64, self.height as u64);
        Self::from_fn(width, height, |x, y| {
            let sx = (x as u64 * sw / width as u64) as u32;
            let sy = (y as u64 * sh / height as u64) as u32;
            self.get(sx, sy)
        })
    }

    fn clear_padding(&mut self) {
        let used = self.width % 8;
        if used == 0 || self.stride == 0 {
            return;
        }
        let mask = 0xFFu8 << (8 - used);
        for row in self.data.chunks_exact_mut(self.stride) {
            if let Some(last) = row.last_mut() {
                *last &= mask;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_white() {
        let bitmap = MonochromeBitmap::new(12, 3);
        assert_eq!(bitmap.stride(), 2);
        assert_eq!(bitmap.as_bytes().len(), 6);
        assert_eq!(bitmap.black_count(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut bitmap = MonochromeBitmap::new(10, 2);
        bitmap.set(0, 0, true);
        bitmap.set(9, 1, true);
        assert!(bitmap.get(0, 0));
        assert!(bitmap.get(9, 1));
        assert!(!bitmap.get(1, 0));
        assert_eq!(bitmap.row(0), &[0x80, 0x00]);
        assert_eq!(bitmap.row(1), &[0x00, 0x40]);
        bitmap.set(0, 0, false);
        assert!(!bitmap.get(0, 0));
    }

    #[test]
    fn test_from_fn_checkerboard() {
        let bitmap = MonochromeBitmap::from_fn(8, 2, |x, y| (x + y) % 2 == 0);
        assert_eq!(bitmap.row(0), &[0xAA]);
        assert_eq!(bitmap.row(1), &[0x55]);
    }

    #[test]
    fn test_from_packed_validates_length() {
        assert!(MonochromeBitmap::from_packed(9, 2, vec![0; 3]).is_err());
        let bitmap = MonochromeBitmap::from_packed(9, 2, vec![0xFF; 4]).unwrap();
        // padding bits are cleared
        assert_eq!(bitmap.row(0), &[0xFF, 0x80]);
    }

    #[test]
    fn test_scaled_doubles_pixels() {
        let bitmap = MonochromeBitmap::from_fn(2, 1, |x, _| x == 0);
        let scaled = bitmap.scaled(4, 2);
        assert_eq!(scaled.row(0), &[0xC0]);
        assert_eq!(scaled.row(1), &[0xC0]);
    }

    #[test]
    fn test_rows_iterator() {
        let bitmap = MonochromeBitmap::from_fn(16, 3, |_, y| y == 1);
        let rows: Vec<&[u8]> = bitmap.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], &[0xFF, 0xFF]);
    }
}
