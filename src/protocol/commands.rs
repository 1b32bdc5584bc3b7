//! # PCL 5 Command Builders
//!
//! Every function here returns the complete byte sequence for one command,
//! including the leading escape byte. Nothing is written anywhere: the
//! [`PclWriter`](super::writer::PclWriter) decides when to emit what.
//!
//! ## Escape Sequence Structure
//!
//! PCL commands are either two-character sequences (`ESC E`) or parameterized
//! sequences made of a parameterized character, a group character, a value
//! and a terminating uppercase character:
//!
//! ```text
//! ESC  &     l     26    A
//!      │     │     │     └── termination character (uppercase)
//!      │     │     └──────── value field (ASCII decimal)
//!      │     └────────────── group character (lowercase)
//!      └──────────────────── parameterized character
//! ```
//!
//! Commands sharing the same parameterized and group characters can be
//! combined by lowercasing every termination character but the last one:
//! `ESC &a 100h 200V` moves horizontally and vertically in one command.
//!
//! ## Units
//!
//! Cursor positions and rectangle sizes built here are in decipoints
//! (1/720 inch). Callers working in millipoints divide by 100.

use super::format::Formatters;
use crate::geometry::PrintDirection;

// ============================================================================
// CONTROL CHARACTERS
// ============================================================================

/// ESC (Escape) - command prefix byte
pub const ESC: u8 = 0x1B;

/// FF (Form Feed) - prints the current page and starts a new one
pub const FF: u8 = 0x0C;

/// Build an escape command from its body.
#[inline]
pub fn escape(body: &str) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(1 + body.len());
    cmd.push(ESC);
    cmd.extend_from_slice(body.as_bytes());
    cmd
}

// ============================================================================
// JOB CONTROL
// ============================================================================

/// # Printer Reset (ESC E)
///
/// Prints any partial page and restores the user default environment.
/// Deletes temporary fonts, macros and patterns.
///
/// ```
/// use prensa::protocol::commands;
///
/// assert_eq!(commands::reset(), vec![0x1B, b'E']);
/// ```
#[inline]
pub fn reset() -> Vec<u8> {
    escape("E")
}

/// # Universal Exit Language (ESC %-12345X)
///
/// Returns control to the printer job language (PJL).
#[inline]
pub fn universal_exit() -> Vec<u8> {
    escape("%-12345X")
}

/// # Job Separation (ESC &l1T)
#[inline]
pub fn separate_jobs() -> Vec<u8> {
    escape("&l1T")
}

/// # Unit of Measure (ESC &u#D)
///
/// Sets the PCL unit in units per inch (96 to 7200).
#[inline]
pub fn unit_of_measure(units_per_inch: u32) -> Vec<u8> {
    escape(&format!("&u{}D", units_per_inch))
}

/// # Raster Graphics Resolution (ESC *t#R)
#[inline]
pub fn raster_resolution(dpi: u32) -> Vec<u8> {
    escape(&format!("*t{}R", dpi))
}

// ============================================================================
// PAGE CONTROL
// ============================================================================

/// Duplex binding selection for `ESC &l#S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DuplexMode {
    Simplex = 0,
    LongEdge = 1,
    ShortEdge = 2,
}

/// # Page Size (ESC &l#A)
///
/// `selector` is the media code of the page definition, e.g. 26 for A4.
#[inline]
pub fn page_size(selector: u16) -> Vec<u8> {
    escape(&format!("&l{}A", selector))
}

/// # Paper Source (ESC &l#H)
///
/// Printer specific. Commonly 1 is the default tray, 2 manual feed,
/// 4 the lower tray and 7 auto-select.
#[inline]
pub fn paper_source(tray: u16) -> Vec<u8> {
    escape(&format!("&l{}H", tray))
}

/// # Paper Destination (ESC &l#G)
///
/// Output bin, 1 is the upper bin on most devices.
#[inline]
pub fn output_bin(bin: u16) -> Vec<u8> {
    escape(&format!("&l{}G", bin))
}

/// # Simplex/Duplex Print (ESC &l#S)
#[inline]
pub fn duplex(mode: DuplexMode) -> Vec<u8> {
    escape(&format!("&l{}S", mode as u8))
}

/// # Logical Page Orientation (ESC &l#O)
#[inline]
pub fn orientation(landscape: bool) -> Vec<u8> {
    escape(if landscape { "&l1O" } else { "&l0O" })
}

/// # Clear Horizontal Margins (ESC 9)
#[inline]
pub fn clear_horizontal_margins() -> Vec<u8> {
    escape("9")
}

/// # Top Margin (ESC &l#E)
///
/// Number of lines between the top of the logical page and the text area.
#[inline]
pub fn top_margin(lines: u32) -> Vec<u8> {
    escape(&format!("&l{}E", lines))
}

// ============================================================================
// CURSOR AND DIRECTION
// ============================================================================

/// # Absolute Cursor Position (ESC &a#h#V)
///
/// A negative horizontal value would be read as a relative move, so the
/// cursor is sent to column 0 first.
///
/// ```
/// use prensa::protocol::{commands, format::Formatters};
///
/// let fmt = Formatters::pcl();
/// assert_eq!(commands::cursor_position(&fmt, 100.5, 20.0), b"\x1b&a100.5h20V".to_vec());
/// assert_eq!(commands::cursor_position(&fmt, -3.0, 20.0), b"\x1b&a0h-3h20V".to_vec());
/// ```
pub fn cursor_position(fmt: &Formatters, x_decipoints: f64, y_decipoints: f64) -> Vec<u8> {
    let x = fmt.coordinate.format(x_decipoints);
    let y = fmt.coordinate.format(y_decipoints);
    if x_decipoints < 0.0 {
        escape(&format!("&a0h{}h{}V", x, y))
    } else {
        escape(&format!("&a{}h{}V", x, y))
    }
}

/// # Relative Horizontal Move (ESC &a+#H / ESC &a-#H)
pub fn move_horizontal(fmt: &Formatters, decipoints: f64) -> Vec<u8> {
    let sign = if decipoints < 0.0 { '-' } else { '+' };
    escape(&format!("&a{}{}H", sign, fmt.coordinate.format(decipoints.abs())))
}

/// # Relative Vertical Move (ESC &a+#V / ESC &a-#V)
///
/// Positive values move down the page.
pub fn move_vertical(fmt: &Formatters, decipoints: f64) -> Vec<u8> {
    let sign = if decipoints < 0.0 { '-' } else { '+' };
    escape(&format!("&a{}{}V", sign, fmt.coordinate.format(decipoints.abs())))
}

/// # Push Cursor Position (ESC &f0S)
///
/// The printer keeps at most 20 entries.
#[inline]
pub fn push_cursor() -> Vec<u8> {
    escape("&f0S")
}

/// # Pop Cursor Position (ESC &f1S)
#[inline]
pub fn pop_cursor() -> Vec<u8> {
    escape("&f1S")
}

/// # Print Direction (ESC &a#P)
///
/// Rotates the coordinate system counterclockwise while keeping the cursor.
///
/// ```
/// use prensa::geometry::PrintDirection;
/// use prensa::protocol::commands;
///
/// assert_eq!(commands::print_direction(PrintDirection::Deg270), b"\x1b&a270P".to_vec());
/// ```
#[inline]
pub fn print_direction(direction: PrintDirection) -> Vec<u8> {
    escape(&format!("&a{}P", direction.degrees()))
}

// ============================================================================
// LANGUAGE SWITCHING
// ============================================================================

/// # Enter HP-GL/2 Mode (ESC %#B)
///
/// `0` restores the previous HP-GL/2 pen position, `1` uses the current
/// PCL cursor position.
#[inline]
pub fn enter_hpgl2(restore_previous_pen: bool) -> Vec<u8> {
    escape(if restore_previous_pen { "%0B" } else { "%1B" })
}

/// # Enter PCL Mode (ESC %#A)
#[inline]
pub fn enter_pcl(restore_previous_cursor: bool) -> Vec<u8> {
    escape(if restore_previous_cursor { "%0A" } else { "%1A" })
}

// ============================================================================
// TRANSPARENCY, PATTERNS AND RECTANGLES
// ============================================================================

#[inline]
fn mode_digit(transparent: bool) -> char {
    if transparent { '0' } else { '1' }
}

/// # Source Transparency Mode (ESC *v#N)
#[inline]
pub fn source_transparency(transparent: bool) -> Vec<u8> {
    escape(&format!("*v{}N", mode_digit(transparent)))
}

/// # Pattern Transparency Mode (ESC *v#O)
#[inline]
pub fn pattern_transparency(transparent: bool) -> Vec<u8> {
    escape(&format!("*v{}O", mode_digit(transparent)))
}

/// Source and pattern transparency combined in one command (ESC *v#n#O).
#[inline]
pub fn transparency(source: bool, pattern: bool) -> Vec<u8> {
    escape(&format!(
        "*v{}n{}O",
        mode_digit(source),
        mode_digit(pattern)
    ))
}

/// Current pattern kinds for `ESC *v#T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PatternKind {
    SolidBlack = 0,
    SolidWhite = 1,
    Shading = 2,
    CrossHatch = 3,
    UserDefined = 4,
}

/// # Pattern ID / Area Fill ID (ESC *c#G)
///
/// For shading fills the value is the gray percentage (0 white to 100 black),
/// for user-defined patterns it is the pattern id.
#[inline]
pub fn pattern_id(id: u32) -> Vec<u8> {
    escape(&format!("*c{}G", id))
}

/// # Select Current Pattern (ESC *v#T)
#[inline]
pub fn select_pattern(kind: PatternKind) -> Vec<u8> {
    escape(&format!("*v{}T", kind as u8))
}

/// # Fill Rectangular Area (ESC *c#P)
///
/// Fills the area set by [`rectangle_size`] using `kind` (0 solid black,
/// 2 shading, 4 user-defined pattern).
#[inline]
pub fn fill_rectangle(kind: PatternKind) -> Vec<u8> {
    escape(&format!("*c{}P", kind as u8))
}

/// # Rectangle Size in Decipoints (ESC *c#h#V)
pub fn rectangle_size(fmt: &Formatters, width_decipoints: f64, height_decipoints: f64) -> Vec<u8> {
    escape(&format!(
        "*c{}h{}V",
        fmt.fine.format(width_decipoints),
        fmt.fine.format(height_decipoints)
    ))
}

/// # Define Pattern header (ESC *c#W)
///
/// Must be followed by exactly `len` bytes of pattern data.
#[inline]
pub fn define_pattern(len: usize) -> Vec<u8> {
    escape(&format!("*c{}W", len))
}

/// # Make Pattern Temporary (ESC *c4Q)
///
/// Applies to the pattern id last set with [`pattern_id`].
#[inline]
pub fn make_pattern_temporary() -> Vec<u8> {
    escape("*c4Q")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_control() {
        assert_eq!(reset(), b"\x1bE".to_vec());
        assert_eq!(universal_exit(), b"\x1b%-12345X".to_vec());
        assert_eq!(separate_jobs(), b"\x1b&l1T".to_vec());
        assert_eq!(unit_of_measure(600), b"\x1b&u600D".to_vec());
        assert_eq!(raster_resolution(300), b"\x1b*t300R".to_vec());
    }

    #[test]
    fn test_page_control() {
        assert_eq!(page_size(26), b"\x1b&l26A".to_vec());
        assert_eq!(paper_source(4), b"\x1b&l4H".to_vec());
        assert_eq!(output_bin(1), b"\x1b&l1G".to_vec());
        assert_eq!(duplex(DuplexMode::LongEdge), b"\x1b&l1S".to_vec());
        assert_eq!(orientation(false), b"\x1b&l0O".to_vec());
        assert_eq!(orientation(true), b"\x1b&l1O".to_vec());
        assert_eq!(clear_horizontal_margins(), b"\x1b9".to_vec());
        assert_eq!(top_margin(0), b"\x1b&l0E".to_vec());
    }

    #[test]
    fn test_cursor_position() {
        let fmt = Formatters::pcl();
        assert_eq!(cursor_position(&fmt, 0.0, 0.0), b"\x1b&a0h0V".to_vec());
        assert_eq!(
            cursor_position(&fmt, 1234.567, 89.0),
            b"\x1b&a1234.57h89V".to_vec()
        );
    }

    #[test]
    fn test_relative_moves() {
        let fmt = Formatters::pcl();
        assert_eq!(move_horizontal(&fmt, 2.5), b"\x1b&a+2.5H".to_vec());
        assert_eq!(move_horizontal(&fmt, -2.5), b"\x1b&a-2.5H".to_vec());
        assert_eq!(move_vertical(&fmt, 1.0), b"\x1b&a+1V".to_vec());
        assert_eq!(move_vertical(&fmt, -1.0), b"\x1b&a-1V".to_vec());
    }

    #[test]
    fn test_transparency() {
        assert_eq!(source_transparency(true), b"\x1b*v0N".to_vec());
        assert_eq!(source_transparency(false), b"\x1b*v1N".to_vec());
        assert_eq!(pattern_transparency(false), b"\x1b*v1O".to_vec());
        assert_eq!(transparency(false, true), b"\x1b*v1n0O".to_vec());
    }

    #[test]
    fn test_rectangle_commands() {
        let fmt = Formatters::pcl();
        assert_eq!(
            rectangle_size(&fmt, 720.0, 36.12345),
            b"\x1b*c720h36.1234V".to_vec()
        );
        assert_eq!(fill_rectangle(PatternKind::Shading), b"\x1b*c2P".to_vec());
        assert_eq!(
            fill_rectangle(PatternKind::UserDefined),
            b"\x1b*c4P".to_vec()
        );
        assert_eq!(pattern_id(32), b"\x1b*c32G".to_vec());
        assert_eq!(select_pattern(PatternKind::SolidWhite), b"\x1b*v1T".to_vec());
        assert_eq!(define_pattern(16), b"\x1b*c16W".to_vec());
        assert_eq!(make_pattern_temporary(), b"\x1b*c4Q".to_vec());
    }

    #[test]
    fn test_language_switching() {
        assert_eq!(enter_hpgl2(false), b"\x1b%1B".to_vec());
        assert_eq!(enter_hpgl2(true), b"\x1b%0B".to_vec());
        assert_eq!(enter_pcl(false), b"\x1b%1A".to_vec());
        assert_eq!(push_cursor(), b"\x1b&f0S".to_vec());
        assert_eq!(pop_cursor(), b"\x1b&f1S".to_vec());
    }
}
