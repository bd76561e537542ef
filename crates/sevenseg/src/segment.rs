//! Digit → segment translation.
//!
//! Segment positions follow the usual a..g lettering:
//!
//! ```text
//!      0
//!    -----
//!  5 |   | 1
//!    --6--
//!  4 |   | 2
//!    -----
//!      3
//! ```
//!
//! Position `p` is driven by GPIO `first_gpio + p`.

use crate::config::SEGMENT_COUNT;

/// Active/inactive state of the seven segments of one digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentPattern([bool; SEGMENT_COUNT]);

impl SegmentPattern {
    /// Every segment dark.
    pub const BLANK: Self = Self([false; SEGMENT_COUNT]);

    /// Pattern from explicit per-segment states.
    #[must_use]
    pub const fn new(segments: [bool; SEGMENT_COUNT]) -> Self {
        Self(segments)
    }

    /// Pattern from `0`/`1` values, in segment order.
    #[must_use]
    #[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)] // const loop bounded by SEGMENT_COUNT
    pub const fn from_bits(bits: [u8; SEGMENT_COUNT]) -> Self {
        let mut segments = [false; SEGMENT_COUNT];
        let mut i = 0;
        while i < SEGMENT_COUNT {
            segments[i] = bits[i] != 0;
            i += 1;
        }
        Self(segments)
    }

    /// Per-segment states in position order.
    #[must_use]
    pub const fn segments(&self) -> [bool; SEGMENT_COUNT] {
        self.0
    }

    /// State of segment `position`, `None` past the last segment.
    #[must_use]
    pub fn segment(&self, position: usize) -> Option<bool> {
        self.0.get(position).copied()
    }

    /// Iterate over segment states in position order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// Number of lit segments.
    #[must_use]
    pub fn lit(&self) -> usize {
        self.0.iter().filter(|on| **on).count()
    }

    /// Three-row ASCII rendering, for diagnostics.
    #[must_use]
    pub fn render(&self) -> [[char; 3]; 3] {
        let [a, b, c, d, e, f, g] = self.0;
        let pick = |on: bool, ch: char| if on { ch } else { ' ' };
        [
            [' ', pick(a, '_'), ' '],
            [pick(f, '|'), pick(g, '_'), pick(b, '|')],
            [pick(e, '|'), pick(d, '_'), pick(c, '|')],
        ]
    }
}

impl core::fmt::Display for SegmentPattern {
    /// Segment states as `0`/`1`, position 0 first (e.g. `1011011` for 5).
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for on in self.iter() {
            f.write_str(if on { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Segment pattern for each decimal digit, indexed by digit.
pub const DIGIT_TABLE: [SegmentPattern; 10] = [
    SegmentPattern::from_bits([1, 1, 1, 1, 1, 1, 0]), // 0
    SegmentPattern::from_bits([0, 1, 1, 0, 0, 0, 0]), // 1
    SegmentPattern::from_bits([1, 1, 0, 1, 1, 0, 1]), // 2
    SegmentPattern::from_bits([1, 1, 1, 1, 0, 0, 1]), // 3
    SegmentPattern::from_bits([0, 1, 1, 0, 0, 1, 1]), // 4
    SegmentPattern::from_bits([1, 0, 1, 1, 0, 1, 1]), // 5
    SegmentPattern::from_bits([1, 0, 1, 1, 1, 1, 1]), // 6
    SegmentPattern::from_bits([1, 1, 1, 0, 0, 0, 1]), // 7
    SegmentPattern::from_bits([1, 1, 1, 1, 1, 1, 1]), // 8
    SegmentPattern::from_bits([1, 1, 1, 1, 0, 1, 1]), // 9
];

/// A decimal digit, `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Digit(u8);

impl Digit {
    /// The digit `0`.
    pub const ZERO: Self = Self(0);

    /// The largest digit, `9`.
    pub const MAX: Self = Self(9);

    /// Digit `value`, or `None` if it is not in `0..=9`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// ASCII character for this digit (`b'0'..=b'9'`).
    #[must_use]
    pub const fn to_ascii(self) -> u8 {
        b'0'.saturating_add(self.0)
    }

    /// Segment pattern that renders this digit.
    #[must_use]
    pub fn pattern(self) -> SegmentPattern {
        DIGIT_TABLE
            .get(usize::from(self.0))
            .copied()
            .unwrap_or(SegmentPattern::BLANK)
    }

    /// All ten digits in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MAX.0).map(Self)
    }
}

impl TryFrom<i64> for Digit {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value).ok().and_then(Self::new).ok_or(value)
    }
}

impl core::fmt::Display for Digit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    #[test]
    fn table_has_one_pattern_per_digit() {
        assert_eq!(DIGIT_TABLE.len(), 10);
        for pattern in DIGIT_TABLE {
            assert_eq!(pattern.segments().len(), SEGMENT_COUNT);
        }
    }

    #[test]
    fn patterns_are_distinct() {
        for (i, a) in DIGIT_TABLE.iter().enumerate() {
            for b in DIGIT_TABLE.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn five_lights_a_c_d_f_g() {
        let five = Digit::new(5).unwrap().pattern();
        assert_eq!(five.segments(), [true, false, true, true, false, true, true]);
        assert_eq!(five.to_string(), "1011011");
    }

    #[test]
    fn eight_lights_everything() {
        assert_eq!(Digit::new(8).unwrap().pattern().lit(), SEGMENT_COUNT);
        assert_eq!(Digit::new(1).unwrap().pattern().lit(), 2);
    }

    #[test]
    fn digit_rejects_values_above_nine() {
        assert_eq!(Digit::new(9), Some(Digit::MAX));
        assert_eq!(Digit::new(10), None);
        assert_eq!(Digit::try_from(-1i64), Err(-1));
        assert_eq!(Digit::try_from(42i64), Err(42));
        assert_eq!(Digit::try_from(3i64), Ok(Digit::new(3).unwrap()));
    }

    #[test]
    fn ascii_encoding() {
        let ascii: Vec<u8> = Digit::all().map(Digit::to_ascii).collect();
        assert_eq!(ascii, b"0123456789");
    }

    #[test]
    fn render_draws_zero() {
        let rows = DIGIT_TABLE[0].render();
        assert_eq!(rows[0], [' ', '_', ' ']);
        assert_eq!(rows[1], ['|', ' ', '|']);
        assert_eq!(rows[2], ['|', '_', '|']);
    }

    #[test]
    fn blank_renders_empty() {
        for row in SegmentPattern::BLANK.render() {
            assert_eq!(row, [' '; 3]);
        }
    }
}
