//! # Raster Graphics Transfer
//!
//! Monochrome raster images are sent one scanline at a time between a
//! start and an end command:
//!
//! ```text
//! ESC *t300R            raster resolution
//! ESC *r0f<h>t<w>s1A    start raster: follow print direction, size, at cursor
//! ESC *b1m<n>W <data>   one scanline, compression mode 1 (run-length)
//! ESC *b0m<n>W <data>   one scanline, compression mode 0 (unencoded)
//! ...
//! ESC *rB               end raster
//! ```
//!
//! ## Run-Length Encoding (mode 1)
//!
//! A scanline is a sequence of `(count, value)` byte pairs where the value is
//! repeated `count + 1` times. A pair therefore covers at most 256 bytes:
//!
//! ```text
//! unencoded:  FF FF FF FF 00 00 AA        (7 bytes)
//! encoded:    03 FF 01 00 00 AA           (6 bytes)
//! ```
//!
//! Encoding alternating patterns doubles their size, so each scanline is sent
//! run-length encoded only when that is strictly shorter than the raw row.
//!
//! ## Bit Packing
//!
//! - Bit 7 (MSB) = leftmost dot
//! - 1 = black, 0 = white
//! - The last byte of a row is padded with white on the right

use std::borrow::Cow;

use super::commands::escape;

/// Largest count byte; one pair repeats its value at most `MAX_REPEAT + 1` times.
pub const MAX_REPEAT: u8 = 255;

/// Compression mode declared before each scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Compression {
    Unencoded = 0,
    RunLength = 1,
}

/// # Start Raster Graphics (ESC *r0f#t#s1A)
///
/// Presentation follows the current print direction; the image starts at
/// the current cursor position.
pub fn start_raster(width_dots: u32, height_dots: u32) -> Vec<u8> {
    escape(&format!("*r0f{}t{}s1A", height_dots, width_dots))
}

/// # End Raster Graphics (ESC *rB)
#[inline]
pub fn end_raster() -> Vec<u8> {
    escape("*rB")
}

/// # Transfer Raster Data header (ESC *b#m#W)
#[inline]
pub fn transfer_header(mode: Compression, len: usize) -> Vec<u8> {
    escape(&format!("*b{}m{}W", mode as u8, len))
}

/// Run-length encode a packed scanline.
///
/// ```
/// use prensa::protocol::raster::encode_rle;
///
/// assert_eq!(encode_rle(&[0xFF, 0xFF, 0xFF, 0x00]), vec![2, 0xFF, 0, 0x00]);
/// ```
pub fn encode_rle(row: &[u8]) -> Vec<u8> {
    encode_rle_bounded(row, usize::MAX).unwrap_or_default()
}

/// Run-length encode a scanline, giving up as soon as the output reaches `limit` bytes.
fn encode_rle_bounded(row: &[u8], limit: usize) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(row.len().min(limit));
    let mut bytes = row.iter().copied();
    let Some(mut value) = bytes.next() else {
        return (limit > 0).then_some(out);
    };
    let mut count: u8 = 0;

    for byte in bytes {
        if byte == value && count < MAX_REPEAT {
            count += 1;
            continue;
        }
        out.push(count);
        out.push(value);
        if out.len() >= limit {
            return None;
        }
        value = byte;
        count = 0;
    }
    out.push(count);
    out.push(value);
    (out.len() < limit).then_some(out)
}

/// Expand a run-length encoded scanline.
///
/// A trailing odd byte (a count without a value) is ignored.
pub fn decode_rle(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for pair in data.chunks_exact(2) {
        let repeat = pair[0] as usize + 1;
        out.extend(std::iter::repeat_n(pair[1], repeat));
    }
    out
}

/// A scanline ready for transfer, in whichever mode is shorter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRow<'a> {
    pub mode: Compression,
    pub payload: Cow<'a, [u8]>,
}

/// Choose the representation for one scanline.
///
/// Run-length encoding is used only when it produces strictly fewer bytes
/// than the unencoded row.
pub fn encode_row(row: &[u8]) -> EncodedRow<'_> {
    match encode_rle_bounded(row, row.len()) {
        Some(rle) => EncodedRow {
            mode: Compression::RunLength,
            payload: Cow::Owned(rle),
        },
        None => EncodedRow {
            mode: Compression::Unencoded,
            payload: Cow::Borrowed(row),
        },
    }
}

/// Complete transfer command (header and payload) for one scanline.
pub fn scanline(row: &[u8]) -> Vec<u8> {
    let encoded = encode_row(row);
    let mut cmd = transfer_header(encoded.mode, encoded.payload.len());
    cmd.extend_from_slice(&encoded.payload);
    cmd
}

/// Recover the unencoded row from a transfer payload.
pub fn decode_row(mode: Compression, payload: &[u8]) -> Vec<u8> {
    match mode {
        Compression::Unencoded => payload.to_vec(),
        Compression::RunLength => decode_rle(payload),
    }
}
