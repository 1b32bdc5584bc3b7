//! # Rendering Module
//!
//! Everything between a source image and the bits of a raster transfer.
//!
//! ## Modules
//!
//! - [`bitmap`]: Packed one-bit-per-pixel bitmaps
//! - [`dither`]: Bayer matrix derivation, ordered dithering and thresholding
//! - [`convert`]: Pluggable monochrome converters
//! - [`resolution`]: Device raster resolution selection
//! - [`encoder`]: Image to raster transfer
//! - [`patterns`]: Gray fill pattern cache
//!
//! ## Usage Example
//!
//! ```
//! use image::{GrayImage, Luma};
//! use prensa::render::dither;
//!
//! // A 50% gray square
//! let gray = GrayImage::from_pixel(8, 8, Luma([128]));
//! let bitmap = dither::ordered(&gray);
//!
//! assert_eq!(bitmap.width(), 8);
//! assert_eq!(bitmap.black_count(), 32);
//! ```

pub mod bitmap;
pub mod convert;
pub mod dither;
pub mod encoder;
pub mod patterns;
pub mod resolution;
