//! # Gray Fill Patterns
//!
//! Black and white map onto the printer's built-in solid fills. Every other
//! color is reduced to its luminance and approximated by a user-defined dither
//! pattern downloaded under a temporary id.
//!
//! There is a single temporary id, so a pattern is valid only until the next
//! gray level is requested. The cache keeps the generated payloads by gray
//! level and remembers which one the printer currently holds, so repeated
//! fills in the same color neither regenerate nor re-download the pattern.

use std::collections::HashMap;

use crate::document::Color;
use crate::protocol::pattern::{MatrixSize, gray_pattern};

/// Pattern id used for dithered gray fills.
pub const TEMPORARY_PATTERN_ID: u32 = 32;

/// What a fill or text color resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRef {
    /// Built-in solid black.
    Black,
    /// Built-in solid white.
    White,
    /// User-defined pattern under the given id.
    Dithered(u32),
}

/// A resolved pattern plus the download to send first, if the printer does
/// not hold it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSelection {
    pub pattern: PatternRef,
    pub download: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct PatternCache {
    size: MatrixSize,
    payloads: HashMap<u8, Vec<u8>>,
    /// Gray level currently downloaded under the temporary id.
    active: Option<u8>,
}

impl PatternCache {
    pub fn new(size: MatrixSize) -> Self {
        Self {
            size,
            payloads: HashMap::new(),
            active: None,
        }
    }

    pub fn matrix_size(&self) -> MatrixSize {
        self.size
    }

    /// Resolve a color.
    ///
    /// ```
    /// use prensa::document::Color;
    /// use prensa::protocol::pattern::MatrixSize;
    /// use prensa::render::patterns::{PatternCache, PatternRef};
    ///
    /// let mut cache = PatternCache::new(MatrixSize::Four);
    /// assert_eq!(cache.pattern_for(Color::BLACK).pattern, PatternRef::Black);
    /// let first = cache.pattern_for(Color::gray(128));
    /// assert!(first.download.is_some());
    /// assert!(cache.pattern_for(Color::gray(128)).download.is_none());
    /// ```
    pub fn pattern_for(&mut self, color: Color) -> PatternSelection {
        if color.is_black() {
            return PatternSelection {
                pattern: PatternRef::Black,
                download: None,
            };
        }
        if color.is_white() {
            return PatternSelection {
                pattern: PatternRef::White,
                download: None,
            };
        }
        let gray = color.luminance();
        let download = if self.active == Some(gray) {
            None
        } else {
            self.active = Some(gray);
            let size = self.size;
            Some(
                self.payloads
                    .entry(gray)
                    .or_insert_with(|| gray_pattern(gray, size))
                    .clone(),
            )
        };
        PatternSelection {
            pattern: PatternRef::Dithered(TEMPORARY_PATTERN_ID),
            download,
        }
    }

    /// Forget what the printer holds, e.g. after a reset.
    pub fn invalidate(&mut self) {
        self.active = None;
    }

    /// Number of distinct gray levels generated so far.
    pub fn cached_levels(&self) -> usize {
        self.payloads.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white_are_builtin() {
        let mut cache = PatternCache::new(MatrixSize::Eight);
        assert_eq!(cache.pattern_for(Color::BLACK).pattern, PatternRef::Black);
        assert_eq!(cache.pattern_for(Color::WHITE).pattern, PatternRef::White);
        assert_eq!(cache.cached_levels(), 0);
    }

    #[test]
    fn test_switching_colors_redownloads() {
        let mut cache = PatternCache::new(MatrixSize::Four);
        let a = cache.pattern_for(Color::gray(100));
        let b = cache.pattern_for(Color::gray(200));
        let a2 = cache.pattern_for(Color::gray(100));
        assert_eq!(a.pattern, PatternRef::Dithered(TEMPORARY_PATTERN_ID));
        assert!(b.download.is_some());
        assert_eq!(a2.download, a.download);
        assert_eq!(cache.cached_levels(), 2);
    }

    #[test]
    fn test_same_luminance_shares_pattern() {
        let mut cache = PatternCache::new(MatrixSize::Four);
        cache.pattern_for(Color::gray(128));
        // (30*128 + 59*128 + 11*128) / 100 == 128
        assert!(cache.pattern_for(Color::gray(128)).download.is_none());
    }

    #[test]
    fn test_invalidate_forces_download() {
        let mut cache = PatternCache::new(MatrixSize::Four);
        cache.pattern_for(Color::gray(50));
        cache.invalidate();
        assert!(cache.pattern_for(Color::gray(50)).download.is_some());
        assert_eq!(cache.cached_levels(), 1);
    }
}
