//! # Prensa - PCL 5 Output Stage
//!
//! Prensa turns laid-out pages into a PCL 5 command stream for laser printers.
//! It provides:
//!
//! - **Protocol implementation**: PCL 5 and HP-GL/2 command builders
//! - **Raster encoding**: grayscale reduction, ordered and error-diffusion
//!   dithering, per-scanline run-length compression
//! - **Geometry**: nested transforms mapped onto the device's print direction
//! - **Page emission**: document and page structure, media selection, borders,
//!   text and images behind one [`Renderer`] trait
//!
//! ## Quick Start
//!
//! ```
//! use prensa::{
//!     document::{BorderSet, BorderSpec, Color, PageSpec},
//!     geometry::{Rect, inch_to_mpt},
//!     painter::{PclRenderer, Renderer},
//!     printer::RenderConfig,
//! };
//!
//! let mut renderer = PclRenderer::new(Vec::new(), RenderConfig::default())?;
//! renderer.start_document()?;
//! renderer.start_page(&PageSpec::new(inch_to_mpt(8.5), inch_to_mpt(11.0)))?;
//! renderer.start_content()?;
//!
//! let frame = Rect::new(72000.0, 72000.0, 216000.0, 72000.0);
//! let border = BorderSet::uniform(BorderSpec::solid(1000.0, Color::BLACK));
//! renderer.draw_borders(frame, &border, Some(Color::gray(230)))?;
//!
//! renderer.end_content()?;
//! renderer.end_page()?;
//! renderer.end_document()?;
//!
//! let job: Vec<u8> = renderer.into_inner();
//! assert!(job.starts_with(b"\x1b%-12345X@PJL COMMENT"));
//! # Ok::<(), prensa::PrensaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | PCL command builders and the command writer |
//! | [`render`] | Monochrome conversion, dithering and raster encoding |
//! | [`geometry`] | Units, transforms and print direction |
//! | [`document`] | Page content handed in by the layout engine |
//! | [`painter`] | Page emission and border compositing |
//! | [`printer`] | Configuration and media definitions |
//! | [`error`] | Error types |

pub mod document;
pub mod error;
pub mod geometry;
pub mod painter;
pub mod printer;
pub mod protocol;
pub mod render;

// Re-exports for convenience
pub use error::{PrensaError, Result};
pub use painter::{PclRenderer, Renderer};
pub use printer::RenderConfig;
