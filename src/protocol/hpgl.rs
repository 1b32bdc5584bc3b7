//! # HP-GL/2 Picture Frame Embedding
//!
//! Pre-rendered vector graphics are passed through inside an HP-GL/2 picture
//! frame anchored at the current PCL cursor:
//!
//! ```text
//! ESC &f0S                    push cursor
//! ESC *c<w>x<h>Y              picture frame size in decipoints
//! ESC *c0T                    anchor frame at cursor
//! ESC %1B                     enter HP-GL/2 at the PCL cursor
//! IN;SP1;SC0,<s>,0,-<s>,2;IR0,100,0,100;PU;PA0,0;
//! <payload>
//! ESC %1A                     back to PCL at the pen position
//! ESC &f1S                    pop cursor
//! ```
//!
//! The isotropic scaling maps one user unit to one point with the y axis
//! pointing down the page, matching the page coordinate system.

use super::commands::{enter_hpgl2, enter_pcl, escape, pop_cursor, push_cursor};
use super::format::Formatters;

/// # Picture Frame Size (ESC *c#x#Y)
pub fn picture_frame_size(fmt: &Formatters, width_decipoints: f64, height_decipoints: f64) -> Vec<u8> {
    escape(&format!(
        "*c{}x{}Y",
        fmt.fine.format(width_decipoints),
        fmt.fine.format(height_decipoints)
    ))
}

/// # Picture Frame Anchor Point (ESC *c0T)
#[inline]
pub fn anchor_picture_frame() -> Vec<u8> {
    escape("*c0T")
}

/// HP-GL/2 setup: initialize, select pen 1, scale, reset the input window,
/// pen up at the origin.
pub fn setup(fmt: &Formatters, scale: f64) -> String {
    let s = fmt.fine.format(scale);
    format!("IN;SP1;SC0,{s},0,-{s},2;IR0,100,0,100;PU;PA0,0;")
}

/// Wrap an HP-GL/2 payload in a picture frame of the given size (decipoints).
///
/// ```
/// use prensa::protocol::{format::Formatters, hpgl};
///
/// let bytes = hpgl::picture_frame(&Formatters::pcl(), 720.0, 360.0, 1.0, b"PD100,0;");
/// assert!(bytes.starts_with(b"\x1b&f0S\x1b*c720x360Y"));
/// assert!(bytes.ends_with(b"PD100,0;\x1b%1A\x1b&f1S"));
/// ```
pub fn picture_frame(
    fmt: &Formatters,
    width_decipoints: f64,
    height_decipoints: f64,
    scale: f64,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = push_cursor();
    out.extend(picture_frame_size(fmt, width_decipoints, height_decipoints));
    out.extend(anchor_picture_frame());
    out.extend(enter_hpgl2(false));
    out.extend_from_slice(setup(fmt, scale).as_bytes());
    out.extend_from_slice(payload);
    out.extend(enter_pcl(false));
    out.extend(pop_cursor());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_setup_string() {
        let fmt = Formatters::pcl();
        assert_eq!(
            setup(&fmt, 2.5),
            "IN;SP1;SC0,2.5,0,-2.5,2;IR0,100,0,100;PU;PA0,0;"
        );
    }

    #[test]
    fn test_full_frame() {
        let fmt = Formatters::pcl();
        let bytes = picture_frame(&fmt, 100.0, 50.5, 1.0, b"PD;");
        let expected = b"\x1b&f0S\x1b*c100x50.5Y\x1b*c0T\x1b%1B\
IN;SP1;SC0,1,0,-1,2;IR0,100,0,100;PU;PA0,0;PD;\x1b%1A\x1b&f1S";
        assert_eq!(bytes, expected.to_vec());
    }
}
