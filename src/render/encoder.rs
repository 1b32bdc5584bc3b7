//! # Raster Encoder
//!
//! Turns any image into a monochrome bitmap at a resolution the device
//! supports, then hands it to the writer for run-length encoded transfer.
//!
//! ```text
//! DynamicImage ──► gray (30R+59G+11B)/100 ──► resample to device dpi ──► convert ──► ESC *r…A
//! MonochromeBitmap ─────────────────────────► resample if needed ─────────────────►
//! ```
//!
//! The device resolution is chosen from the image's effective resolution on the
//! page, stepped up for a sharper dither and capped by the configured maximum.

use std::io::Write;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use super::bitmap::MonochromeBitmap;
use super::convert::{MonochromeConverter, converter_for};
use super::resolution;
use crate::document::Image;
use crate::error::{PrensaError, Result};
use crate::geometry::{MPT_PER_INCH, Size, mpt_to_px};
use crate::printer::{DitherMethod, RenderConfig};
use crate::protocol::commands::PatternKind;
use crate::protocol::writer::PclWriter;

/// Largest raster the encoder will build, in pixels.
pub(crate) const MAX_PIXELS: u64 = 1 << 28;

/// Pixel grid an image is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterPlan {
    pub dpi: u32,
    pub width: u32,
    pub height: u32,
}

pub struct RasterEncoder {
    converter: Box<dyn MonochromeConverter>,
    max_resolution: u32,
}

impl RasterEncoder {
    pub fn new(converter: Box<dyn MonochromeConverter>, max_resolution: u32) -> Result<Self> {
        if !resolution::is_supported(max_resolution) {
            return Err(PrensaError::InvalidArgument(format!(
                "maximum raster resolution {} is not supported",
                max_resolution
            )));
        }
        Ok(Self {
            converter,
            max_resolution,
        })
    }

    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        Self::new(converter_for(config.converter), config.max_bitmap_resolution)
    }

    pub fn converter_name(&self) -> &'static str {
        self.converter.name()
    }

    pub fn max_resolution(&self) -> u32 {
        self.max_resolution
    }

    /// Reduce any color model to 8-bit gray, compositing alpha onto white.
    pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
        if let DynamicImage::ImageLuma8(gray) = image {
            return gray.clone();
        }
        let rgba = image.to_rgba8();
        GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let over_white = |c: u8| (c as u32 * a as u32 + 255 * (255 - a as u32)) / 255;
            let luma = (30 * over_white(r) + 59 * over_white(g) + 11 * over_white(b)) / 100;
            Luma([luma as u8])
        })
    }

    /// Resolution and pixel size for an image of `pixels` shown at `target`
    /// millipoints.
    pub fn plan(&self, pixels: (u32, u32), target: Size, increased_precision: bool) -> Result<RasterPlan> {
        let (pw, ph) = pixels;
        if target.width <= 0.0 || target.height <= 0.0 {
            return Err(PrensaError::InvalidArgument(format!(
                "image target size must be positive, got {}x{}",
                target.width, target.height
            )));
        }
        let h_res = pw as f64 * MPT_PER_INCH / target.width;
        let v_res = ph as f64 * MPT_PER_INCH / target.height;
        let target_res = h_res.max(v_res);
        let dpi = resolution::select(
            target_res.round() as u32,
            increased_precision,
            self.max_resolution,
        )?;
        let (width, height) = if target_res == dpi as f64 {
            (pw, ph)
        } else {
            (
                mpt_to_px(target.width, dpi).ceil() as u32,
                mpt_to_px(target.height, dpi).ceil() as u32,
            )
        };
        if width as u64 * height as u64 > MAX_PIXELS {
            return Err(PrensaError::Image(format!(
                "raster of {}x{} pixels is too large",
                width, height
            )));
        }
        Ok(RasterPlan { dpi, width, height })
    }

    /// Monochrome bitmap of `image` at exactly `width` x `height` pixels.
    ///
    /// One-bit input is only resampled, never dithered again.
    pub fn to_monochrome(
        &self,
        image: &Image,
        width: u32,
        height: u32,
        method: DitherMethod,
    ) -> Result<MonochromeBitmap> {
        match image {
            Image::Monochrome(bitmap) => Ok(bitmap.scaled(width, height)),
            Image::Raster(img) => {
                let mut gray = Self::to_grayscale(img);
                if gray.dimensions() != (width, height) {
                    gray = imageops::resize(&gray, width, height, FilterType::Triangle);
                }
                self.converter
                    .convert(&DynamicImage::ImageLuma8(gray), method)
            }
        }
    }

    /// Paint `image` at the cursor, scaled to `target` millipoints.
    pub fn paint<W: Write>(
        &self,
        writer: &mut PclWriter<W>,
        image: &Image,
        target: Size,
        source_transparent: bool,
        method: DitherMethod,
    ) -> Result<()> {
        let (pw, ph) = image.dimensions();
        if pw == 0 || ph == 0 || target.width == 0.0 || target.height == 0.0 {
            return Ok(());
        }
        let plan = self.plan((pw, ph), target, true)?;
        debug!(
            source_width = pw,
            source_height = ph,
            dpi = plan.dpi,
            width = plan.width,
            height = plan.height,
            converter = self.converter.name(),
            "painting bitmap"
        );
        let bitmap = self.to_monochrome(image, plan.width, plan.height, method)?;
        match image {
            Image::Monochrome(_) => {
                writer.set_source_transparency(source_transparent)?;
                writer.select_pattern(PatternKind::SolidBlack)?;
            }
            Image::Raster(_) => {
                writer.select_pattern(PatternKind::SolidBlack)?;
                writer.set_transparency(source_transparent, true)?;
            }
        }
        writer.paint_monochrome(&bitmap, plan.dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::pattern::MatrixSize;
    use crate::render::convert::DefaultConverter;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn encoder(max: u32) -> RasterEncoder {
        RasterEncoder::new(Box::new(DefaultConverter), max).unwrap()
    }

    #[test]
    fn test_rejects_unsupported_cap() {
        assert!(RasterEncoder::new(Box::new(DefaultConverter), 1200).is_err());
    }

    #[test]
    fn test_grayscale_weights() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 0, 0])));
        assert_eq!(RasterEncoder::to_grayscale(&img).get_pixel(0, 0).0[0], 76);
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0])));
        assert_eq!(RasterEncoder::to_grayscale(&clear).get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_plan_exact_resolution_keeps_pixels() {
        // 300 px over one inch
        let plan = encoder(600)
            .plan((300, 150), Size::new(72000.0, 36000.0), false)
            .unwrap();
        assert_eq!(plan, RasterPlan { dpi: 300, width: 300, height: 150 });
    }

    #[test]
    fn test_plan_resamples_to_tier() {
        // 120 dpi image, increased precision steps up to 300
        let plan = encoder(600)
            .plan((120, 120), Size::new(72000.0, 72000.0), true)
            .unwrap();
        assert_eq!(plan, RasterPlan { dpi: 300, width: 300, height: 300 });
        let capped = encoder(150)
            .plan((120, 120), Size::new(72000.0, 72000.0), true)
            .unwrap();
        assert_eq!(capped.dpi, 150);
    }

    #[test]
    fn test_plan_rejects_empty_target() {
        assert!(encoder(600).plan((10, 10), Size::new(0.0, 10.0), false).is_err());
    }

    #[test]
    fn test_monochrome_passthrough() {
        let bitmap = MonochromeBitmap::from_fn(8, 8, |x, y| (x + y) % 2 == 0);
        let out = encoder(600)
            .to_monochrome(&Image::Monochrome(bitmap.clone()), 8, 8, DitherMethod::Ordered)
            .unwrap();
        assert_eq!(out, bitmap);
    }

    #[test]
    fn test_paint_raster_sequence() {
        let mut writer = PclWriter::new(Vec::new(), MatrixSize::Four);
        let img = Image::Raster(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            300,
            300,
            Luma([0]),
        )));
        encoder(600)
            .paint(
                &mut writer,
                &img,
                Size::new(72000.0, 72000.0),
                false,
                DitherMethod::Ordered,
            )
            .unwrap();
        let bytes = writer.into_inner();
        // 300 dpi with increased precision goes to 600: 600x600 black
        assert!(bytes.starts_with(b"\x1b*v0T\x1b*v1N\x1b*t600R\x1b*r0f600t600s1A"));
        assert!(bytes.ends_with(b"\x1b*rB"));
    }
}
