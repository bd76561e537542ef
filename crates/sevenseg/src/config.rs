//! Driver configuration and constants
//!
//! Host tooling locates the device by name, so the region, the class, the
//! device node and the GPIO labels all use the same literal.

use platform::GpioNum;

use crate::segment::Digit;

/// Name used for the device-number region, class, node and GPIO labels.
pub const DRIVER_NAME: &str = "7segs";

/// First GPIO wired to the display (segment 0).
pub const FIRST_SEGMENT_GPIO: GpioNum = GpioNum::new(7);

/// Number of segments, and therefore GPIO lines, in one digit.
pub const SEGMENT_COUNT: usize = 7;

/// Bytes a single `write` may carry; longer payloads are rejected.
pub const WRITE_BUFFER_CAPACITY: usize = 10;

/// First minor number requested for the device.
pub const FIRST_MINOR: u32 = 0;

/// Minor numbers reserved; the driver exposes exactly one node.
pub const DEVICE_COUNT: u32 = 1;

/// What the display shows between load and the first write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootDisplay {
    /// Every segment dark. Reads still report `0` until the first write.
    #[default]
    Blank,
    /// Light `digit` right after the lines are exported; reads report it.
    Digit(Digit),
}

/// Load-time configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Region, class, node and GPIO label.
    pub name: &'static str,
    /// GPIO driving segment 0; segments 1..6 follow consecutively.
    pub first_gpio: GpioNum,
    /// Boot-time display policy.
    pub boot_display: BootDisplay,
}

impl DriverConfig {
    /// Configuration for the reference wiring (GPIO 7..13, blank at boot).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: DRIVER_NAME,
            first_gpio: FIRST_SEGMENT_GPIO,
            boot_display: BootDisplay::Blank,
        }
    }

    /// Replace the boot display policy.
    #[must_use]
    pub const fn with_boot_display(mut self, boot_display: BootDisplay) -> Self {
        self.boot_display = boot_display;
        self
    }

    /// Move the display to another block of seven consecutive GPIOs.
    #[must_use]
    pub const fn with_first_gpio(mut self, first_gpio: GpioNum) -> Self {
        self.first_gpio = first_gpio;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}
