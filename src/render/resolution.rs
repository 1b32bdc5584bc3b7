//! Raster resolutions the device accepts for `ESC *t#R`.

use crate::error::{PrensaError, Result};

/// Supported raster resolutions in dots per inch, ascending.
pub const SUPPORTED_RESOLUTIONS: [u32; 6] = [75, 100, 150, 200, 300, 600];

/// Whether `dpi` is one of [`SUPPORTED_RESOLUTIONS`].
pub fn is_supported(dpi: u32) -> bool {
    SUPPORTED_RESOLUTIONS.contains(&dpi)
}

/// Pick the device resolution for an image with `requested` effective dpi.
///
/// The choice is the smallest supported resolution at or above `requested`,
/// stepped up one or two tiers when `increased_precision` asks for a sharper
/// dither, then lowered until it fits under `max`. A request above every
/// tier yields the highest one.
///
/// ```
/// use prensa::render::resolution::select;
///
/// assert_eq!(select(300, false, 600).unwrap(), 300);
/// assert_eq!(select(120, false, 600).unwrap(), 150);
/// assert_eq!(select(120, true, 600).unwrap(), 300);
/// assert_eq!(select(1200, false, 300).unwrap(), 300);
/// ```
pub fn select(requested: u32, increased_precision: bool, max: u32) -> Result<u32> {
    if !is_supported(max) {
        return Err(PrensaError::InvalidArgument(format!(
            "maximum raster resolution {} is not one of {:?}",
            max, SUPPORTED_RESOLUTIONS
        )));
    }
    let count = SUPPORTED_RESOLUTIONS.len();
    let mut choice = if increased_precision { 2 } else { 0 };
    for i in (0..count - 1).rev() {
        if requested > SUPPORTED_RESOLUTIONS[i] {
            let mut idx = i + 1;
            if idx < count - 2 {
                idx += if increased_precision { 2 } else { 0 };
            } else if idx < count - 1 {
                idx += if increased_precision { 1 } else { 0 };
            }
            choice = idx;
            break;
        }
    }
    while choice > 0 && SUPPORTED_RESOLUTIONS[choice] > max {
        choice -= 1;
    }
    Ok(SUPPORTED_RESOLUTIONS[choice])
}

/// The highest supported resolution not exceeding `dpi`, if any.
pub fn floor(dpi: u32) -> Option<u32> {
    SUPPORTED_RESOLUTIONS
        .iter()
        .copied()
        .rev()
        .find(|&r| r <= dpi)
}
