//! # Built-in Font Selection
//!
//! Resolved font keys map onto fonts every PCL 5 printer carries. Selection
//! is by symbol set followed by the font characteristics:
//!
//! ```text
//! ESC (0N                         ISO 8859-1 Latin 1
//! ESC (s1p12v0s0b16602T           proportional, 12pt, upright, medium, Arial
//! ```
//!
//! | Keys    | Family       | Typeface |
//! |---------|--------------|----------|
//! | F1-F4   | Helvetica    | 16602    |
//! | F5-F8   | Times        | 16901    |
//! | F9-F12  | Courier      | 4099     |
//! | F13     | Symbol       | 16686    |
//! | F14     | ZapfDingbats | 45101    |
//!
//! Within each family of four the keys are regular, oblique, bold and bold
//! oblique. Courier is fixed pitch and is selected by pitch instead of height.

use super::commands::escape;
use super::format::Formatters;

/// Symbol set of a built-in font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolSet {
    /// `ESC (0N`
    Latin1,
    /// `ESC (19M`
    Symbol,
    /// `ESC (14L`
    Dingbats,
}

impl SymbolSet {
    fn code(self) -> &'static str {
        match self {
            Self::Latin1 => "0N",
            Self::Symbol => "19M",
            Self::Dingbats => "14L",
        }
    }
}

/// How the font size is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    /// Height in points (`ESC (s1p#v`)
    Proportional,
    /// Characters per inch (`ESC (s0p#h`)
    Fixed,
}

/// One entry of the built-in font table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinFont {
    pub key: &'static str,
    pub symbol_set: SymbolSet,
    pub spacing: Spacing,
    /// 0 upright, 1 italic
    pub style: u8,
    /// 0 medium, 3 bold
    pub weight: u8,
    pub typeface: u32,
}

const fn latin(key: &'static str, spacing: Spacing, style: u8, weight: u8, typeface: u32) -> BuiltinFont {
    BuiltinFont {
        key,
        symbol_set: SymbolSet::Latin1,
        spacing,
        style,
        weight,
        typeface,
    }
}

/// The built-in font table.
pub const BUILTIN_FONTS: [BuiltinFont; 14] = [
    latin("F1", Spacing::Proportional, 0, 0, 16602),
    latin("F2", Spacing::Proportional, 1, 0, 16602),
    latin("F3", Spacing::Proportional, 0, 3, 16602),
    latin("F4", Spacing::Proportional, 1, 3, 16602),
    latin("F5", Spacing::Proportional, 0, 0, 16901),
    latin("F6", Spacing::Proportional, 1, 0, 16901),
    latin("F7", Spacing::Proportional, 0, 3, 16901),
    latin("F8", Spacing::Proportional, 1, 3, 16901),
    latin("F9", Spacing::Fixed, 0, 0, 4099),
    latin("F10", Spacing::Fixed, 1, 0, 4099),
    latin("F11", Spacing::Fixed, 0, 3, 4099),
    latin("F12", Spacing::Fixed, 1, 3, 4099),
    BuiltinFont {
        key: "F13",
        symbol_set: SymbolSet::Symbol,
        spacing: Spacing::Proportional,
        style: 0,
        weight: 0,
        typeface: 16686,
    },
    BuiltinFont {
        key: "F14",
        symbol_set: SymbolSet::Dingbats,
        spacing: Spacing::Proportional,
        style: 0,
        weight: 0,
        typeface: 45101,
    },
];

/// Look up a resolved font key.
pub fn lookup(key: &str) -> Option<&'static BuiltinFont> {
    BUILTIN_FONTS.iter().find(|f| f.key == key)
}

impl BuiltinFont {
    /// Selection command for this font at `size_pt` points.
    ///
    /// Fixed-pitch fonts convert the size to a pitch of `120.01 / size`
    /// characters per inch.
    ///
    /// ```
    /// use prensa::protocol::{fonts, format::Formatters};
    ///
    /// let fmt = Formatters::pcl();
    /// let helvetica = fonts::lookup("F1").unwrap();
    /// assert_eq!(helvetica.select(&fmt, 12.0), b"\x1b(0N\x1b(s1p12v0s0b16602T".to_vec());
    /// ```
    pub fn select(&self, fmt: &Formatters, size_pt: f64) -> Vec<u8> {
        let mut cmd = escape(&format!("({}", self.symbol_set.code()));
        let size = match self.spacing {
            Spacing::Proportional => format!("1p{}v", fmt.coordinate.format(size_pt)),
            Spacing::Fixed => {
                let pitch = if size_pt > 0.0 { 120.01 / size_pt } else { 10.0 };
                format!("0p{}h", fmt.coordinate.format(pitch))
            }
        };
        cmd.extend(escape(&format!(
            "(s{}{}s{}b{}T",
            size, self.style, self.weight, self.typeface
        )));
        cmd
    }
}

/// Encode text in ISO 8859-1, or `None` if a character falls outside it.
pub fn encode_latin1(text: &str) -> Option<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_keys_present() {
        for n in 1..=14 {
            assert!(lookup(&format!("F{}", n)).is_some(), "F{} missing", n);
        }
        assert!(lookup("F15").is_none());
        assert!(lookup("Helvetica").is_none());
    }

    #[test]
    fn test_bold_italic_times() {
        let fmt = Formatters::pcl();
        let font = lookup("F8").unwrap();
        assert_eq!(
            font.select(&fmt, 10.5),
            b"\x1b(0N\x1b(s1p10.5v1s3b16901T".to_vec()
        );
    }

    #[test]
    fn test_courier_pitch() {
        let fmt = Formatters::pcl();
        let font = lookup("F9").unwrap();
        assert_eq!(
            font.select(&fmt, 12.0),
            b"\x1b(0N\x1b(s0p10h0s0b4099T".to_vec()
        );
    }

    #[test]
    fn test_symbol_sets() {
        let fmt = Formatters::pcl();
        assert_eq!(
            lookup("F13").unwrap().select(&fmt, 9.0),
            b"\x1b(19M\x1b(s1p9v0s0b16686T".to_vec()
        );
        assert_eq!(
            lookup("F14").unwrap().select(&fmt, 9.0),
            b"\x1b(14L\x1b(s1p9v0s0b45101T".to_vec()
        );
    }

    #[test]
    fn test_latin1() {
        assert_eq!(encode_latin1("Año €"), None);
        assert_eq!(encode_latin1("Año"), Some(vec![b'A', 0xF1, b'o']));
        assert_eq!(encode_latin1(""), Some(vec![]));
    }
}
