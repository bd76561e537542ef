//! The seven segment lines as a unit.

use platform::{GpioNum, GpioRegistry, PinState};

use crate::config::SEGMENT_COUNT;
use crate::segment::SegmentPattern;

/// GPIO lines driving segments 0..6, in segment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentLines {
    lines: [GpioNum; SEGMENT_COUNT],
}

impl SegmentLines {
    /// Seven consecutive lines starting at `first`, `None` if the block
    /// would run past `u32::MAX`.
    #[must_use]
    pub fn contiguous(first: GpioNum) -> Option<Self> {
        let mut lines = [first; SEGMENT_COUNT];
        for (offset, line) in (0u32..).zip(lines.iter_mut()) {
            *line = first.offset(offset)?;
        }
        Some(Self { lines })
    }

    /// Line driving segment 0.
    #[must_use]
    pub fn first(&self) -> GpioNum {
        self.lines.first().copied().unwrap_or(GpioNum::new(0))
    }

    /// Lines in segment order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = GpioNum> + '_ {
        self.lines.iter().copied()
    }

    /// Drive every line to the matching segment of `pattern`.
    pub fn apply<G: GpioRegistry + ?Sized>(&self, gpio: &mut G, pattern: SegmentPattern) {
        for (line, on) in self.iter().zip(pattern.iter()) {
            gpio.set_value(line, PinState::from(on));
        }
    }

    /// Read the lines back into a pattern.
    pub fn read_back<G: GpioRegistry + ?Sized>(&self, gpio: &G) -> SegmentPattern {
        let mut segments = [false; SEGMENT_COUNT];
        for (segment, line) in segments.iter_mut().zip(self.iter()) {
            *segment = gpio.get_value(line).into();
        }
        SegmentPattern::new(segments)
    }
}
