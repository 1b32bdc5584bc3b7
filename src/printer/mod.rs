//! # Printer Module
//!
//! Device-facing configuration and media definitions.
//!
//! ## Modules
//!
//! - [`config`]: Render configuration consumed from the environment
//! - [`media`]: Page frame registry (physical sizes, logical page, selectors)

pub mod config;
pub mod media;

pub use config::{ConverterChoice, DitherMethod, RenderConfig, RenderingMode};
pub use media::{FrameSelection, PageFrame, PageFrameRegistry};
