//! # Render Configuration
//!
//! Everything the output stage takes from its environment. Loading the values
//! from a file is left to the caller; any serde format works:
//!
//! ```
//! use prensa::printer::{RenderConfig, RenderingMode};
//!
//! let config = RenderConfig {
//!     target_resolution: 300,
//!     rendering_mode: RenderingMode::Speed,
//!     ..RenderConfig::default()
//! };
//! config.validate().unwrap();
//! assert_eq!(config.device_resolution(), 300);
//! ```
//!
//! ## Fields
//!
//! | Key                     | Default   | Meaning                                        |
//! |-------------------------|-----------|------------------------------------------------|
//! | `target-resolution`     | 600       | Device resolution, clamped to 300 or 600       |
//! | `max-bitmap-resolution` | 600       | Cap for raster transfers (75..600)             |
//! | `disable-pjl`           | false     | Omit the PJL job header and trailer            |
//! | `rendering-mode`        | quality   | `quality`, `speed` or `bitmap`                 |
//! | `converter`             | auto      | Monochrome converter (`auto`, `default`)       |
//! | `image-dithering`       | ordered   | `threshold`, `ordered` or `error-diffusion`    |
//! | `pattern-matrix-size`   | 4         | Gray fill pattern matrix (4 or 8)              |
//! | `producer`              | prensa    | Name in the PJL comment                        |
//! | `job-name`              | none      | PJL job name                                   |

use serde::{Deserialize, Serialize};

use crate::error::{PrensaError, Result};
use crate::protocol::pattern::MatrixSize;
use crate::render::resolution;

/// Trade-off between output fidelity and stream size/speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderingMode {
    /// Mitered borders rendered as bitmaps, dithered marks.
    #[default]
    Quality,
    /// Borders as plain rectangle fills, thresholded marks.
    Speed,
    /// Like quality, and every text run is sent as a bitmap.
    Bitmap,
}

/// Which monochrome converter to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConverterChoice {
    /// The best converter compiled in.
    #[default]
    Auto,
    /// Always the built-in ordered/threshold converter.
    Default,
}

/// Grayscale to monochrome reduction method for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherMethod {
    Threshold,
    #[default]
    Ordered,
    ErrorDiffusion,
}

/// Output stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    pub target_resolution: u32,
    pub max_bitmap_resolution: u32,
    pub disable_pjl: bool,
    pub rendering_mode: RenderingMode,
    pub converter: ConverterChoice,
    pub image_dithering: DitherMethod,
    pub pattern_matrix_size: u32,
    pub producer: String,
    pub job_name: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_resolution: 600,
            max_bitmap_resolution: 600,
            disable_pjl: false,
            rendering_mode: RenderingMode::Quality,
            converter: ConverterChoice::Auto,
            image_dithering: DitherMethod::Ordered,
            pattern_matrix_size: 4,
            producer: concat!("prensa ", env!("CARGO_PKG_VERSION")).to_string(),
            job_name: None,
        }
    }
}

impl RenderConfig {
    /// Reject values the device cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.target_resolution == 0 {
            return Err(PrensaError::InvalidArgument(
                "target resolution must be positive".to_string(),
            ));
        }
        if !resolution::is_supported(self.max_bitmap_resolution) {
            return Err(PrensaError::InvalidArgument(format!(
                "max bitmap resolution {} is not one of {:?}",
                self.max_bitmap_resolution,
                resolution::SUPPORTED_RESOLUTIONS
            )));
        }
        MatrixSize::from_side(self.pattern_matrix_size)?;
        if self.producer.contains(['\n', '\r']) {
            return Err(PrensaError::InvalidArgument(
                "producer must be a single line".to_string(),
            ));
        }
        if self
            .job_name
            .as_deref()
            .is_some_and(|name| name.contains(['\n', '\r', '"']))
        {
            return Err(PrensaError::InvalidArgument(
                "job name must be a single line without quotes".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolution the document runs at: 300 for targets up to 300, else 600.
    pub fn device_resolution(&self) -> u32 {
        if self.target_resolution <= 300 {
            300
        } else {
            600
        }
    }

    /// Matrix size for gray fill patterns.
    pub fn pattern_size(&self) -> Result<MatrixSize> {
        MatrixSize::from_side(self.pattern_matrix_size)
    }

    pub fn is_speed_optimized(&self) -> bool {
        self.rendering_mode == RenderingMode::Speed
    }

    pub fn all_text_as_bitmaps(&self) -> bool {
        self.rendering_mode == RenderingMode::Bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RenderConfig::default();
        config.validate().unwrap();
        assert_eq!(config.device_resolution(), 600);
        assert_eq!(config.pattern_size().unwrap(), MatrixSize::Four);
    }

    #[test]
    fn test_device_resolution_tiers() {
        let mut config = RenderConfig::default();
        for (target, expected) in [(72, 300), (300, 300), (301, 600), (1200, 600)] {
            config.target_resolution = target;
            assert_eq!(config.device_resolution(), expected);
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = RenderConfig {
            max_bitmap_resolution: 250,
            ..RenderConfig::default()
        };
        assert!(matches!(bad.validate(), Err(PrensaError::InvalidArgument(_))));

        let bad = RenderConfig {
            pattern_matrix_size: 16,
            ..RenderConfig::default()
        };
        assert!(bad.validate().is_err());

        let bad = RenderConfig {
            target_resolution: 0,
            ..RenderConfig::default()
        };
        assert!(bad.validate().is_err());

        let bad = RenderConfig {
            job_name: Some("a\"b".to_string()),
            ..RenderConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_deserialize_kebab_case() {
        let json = r#"{
            "target-resolution": 300,
            "disable-pjl": true,
            "rendering-mode": "bitmap",
            "image-dithering": "error-diffusion",
            "job-name": "invoice"
        }"#;
        let config: RenderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.target_resolution, 300);
        assert!(config.disable_pjl);
        assert!(config.all_text_as_bitmaps());
        assert_eq!(config.image_dithering, DitherMethod::ErrorDiffusion);
        assert_eq!(config.job_name.as_deref(), Some("invoice"));
        // unspecified fields keep their defaults
        assert_eq!(config.max_bitmap_resolution, 600);
        assert_eq!(config.converter, ConverterChoice::Auto);
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = RenderConfig {
            rendering_mode: RenderingMode::Speed,
            pattern_matrix_size: 8,
            ..RenderConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"rendering-mode\":\"speed\""));
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
