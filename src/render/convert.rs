//! # Monochrome Conversion
//!
//! Grayscale to one-bit reduction behind a small strategy trait. The built-in
//! [`DefaultConverter`] thresholds or ordered-dithers; with the
//! `error-diffusion` feature a [`DiffusionConverter`] adds Floyd-Steinberg
//! error diffusion. [`converter_for`] picks one; a converter that is not
//! compiled in is simply never chosen.

use image::{DynamicImage, GrayImage};

use super::bitmap::MonochromeBitmap;
use super::dither;
use crate::error::{PrensaError, Result};
use crate::printer::{ConverterChoice, DitherMethod};

/// Reduces an 8-bit grayscale image to a monochrome bitmap.
pub trait MonochromeConverter {
    fn name(&self) -> &'static str;

    /// Convert `gray`, which must be single-channel 8-bit luma.
    fn convert(&self, gray: &DynamicImage, method: DitherMethod) -> Result<MonochromeBitmap>;
}

fn require_luma(image: &DynamicImage) -> Result<&GrayImage> {
    match image {
        DynamicImage::ImageLuma8(gray) => Ok(gray),
        other => Err(PrensaError::InvalidArgument(format!(
            "monochrome conversion needs 8-bit grayscale, got {:?}",
            other.color()
        ))),
    }
}

/// Threshold and ordered Bayer dithering.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl MonochromeConverter for DefaultConverter {
    fn name(&self) -> &'static str {
        "default"
    }

    fn convert(&self, gray: &DynamicImage, method: DitherMethod) -> Result<MonochromeBitmap> {
        let gray = require_luma(gray)?;
        Ok(match method {
            DitherMethod::Threshold => dither::threshold_image(gray),
            // no error diffusion here, ordered is the closest
            DitherMethod::Ordered | DitherMethod::ErrorDiffusion => dither::ordered(gray),
        })
    }
}

/// Floyd-Steinberg error diffusion through the `image` crate.
#[cfg(feature = "error-diffusion")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffusionConverter;

#[cfg(feature = "error-diffusion")]
impl MonochromeConverter for DiffusionConverter {
    fn name(&self) -> &'static str {
        "error-diffusion"
    }

    fn convert(&self, gray: &DynamicImage, method: DitherMethod) -> Result<MonochromeBitmap> {
        if method != DitherMethod::ErrorDiffusion {
            return DefaultConverter.convert(gray, method);
        }
        let mut work = require_luma(gray)?.clone();
        image::imageops::dither(&mut work, &image::imageops::BiLevel);
        Ok(MonochromeBitmap::from_fn(work.width(), work.height(), |x, y| {
            work.get_pixel(x, y).0[0] == 0
        }))
    }
}

/// Pick a converter. `Auto` prefers error diffusion when it is compiled in.
pub fn converter_for(choice: ConverterChoice) -> Box<dyn MonochromeConverter> {
    match choice {
        ConverterChoice::Default => Box::new(DefaultConverter),
        ConverterChoice::Auto => best_available(),
    }
}

#[cfg(feature = "error-diffusion")]
fn best_available() -> Box<dyn MonochromeConverter> {
    Box::new(DiffusionConverter)
}

#[cfg(not(feature = "error-diffusion"))]
fn best_available() -> Box<dyn MonochromeConverter> {
    Box::new(DefaultConverter)
}
