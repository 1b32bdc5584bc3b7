//! # PCL 5 Protocol Implementation
//!
//! Low-level command builders for PCL 5 and the writer that sends them.
//!
//! ## Module Structure
//!
//! - [`commands`]: Job, page, cursor, transparency and fill commands
//! - [`format`]: Locale-independent decimal formatting of parameters
//! - [`raster`]: Raster transfer and scanline run-length encoding
//! - [`pattern`]: User-defined gray dither patterns
//! - [`fonts`]: Built-in font selection
//! - [`hpgl`]: HP-GL/2 picture frames for vector pass-through
//! - [`writer`]: Byte sink with transparency and pattern state
//!
//! ## Usage Example
//!
//! ```
//! use prensa::protocol::{commands, format::Formatters, raster};
//!
//! let fmt = Formatters::pcl();
//! let mut data = Vec::new();
//!
//! // Reset and set the units
//! data.extend(commands::reset());
//! data.extend(commands::unit_of_measure(600));
//!
//! // Move to one inch from the top-left of the logical page
//! data.extend(commands::cursor_position(&fmt, 720.0, 720.0));
//!
//! // One 16-dot raster row
//! data.extend(commands::raster_resolution(300));
//! data.extend(raster::start_raster(16, 1));
//! data.extend(raster::scanline(&[0xFF, 0xFF]));
//! data.extend(raster::end_raster());
//! ```
//!
//! ## Protocol Reference
//!
//! Command names and parameter ranges follow the "PCL 5 Printer Language
//! Technical Reference Manual" by Hewlett-Packard.

pub mod commands;
pub mod fonts;
pub mod format;
pub mod hpgl;
pub mod pattern;
pub mod raster;
pub mod writer;
