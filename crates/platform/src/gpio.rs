//! GPIO abstraction layer
//!
//! Models the integer-addressed GPIO API of the host kernel: lines are
//! validated, requested under a label, configured, optionally exported to
//! sysfs, driven, and finally freed.

use crate::error::Result;

/// Platform GPIO number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioNum(u32);

impl GpioNum {
    /// Wrap a raw GPIO number.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw GPIO number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The GPIO `offset` lines after this one, or `None` on overflow.
    #[must_use]
    pub const fn offset(self, offset: u32) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl core::fmt::Display for GpioNum {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "GPIO_{}", self.0)
    }
}

/// Pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    /// High (logic 1, segment lit)
    High,
    /// Low (logic 0, segment dark)
    #[default]
    Low,
}

impl PinState {
    /// `1` for [`PinState::High`], `0` for [`PinState::Low`].
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Low => 0,
        }
    }
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<PinState> for bool {
    fn from(value: PinState) -> Self {
        matches!(value, PinState::High)
    }
}

/// Integer-addressed GPIO registry.
///
/// Only [`GpioRegistry::request`], [`GpioRegistry::direction_output`] and
/// [`GpioRegistry::export`] can fail; value access on a requested line and
/// release calls cannot.
pub trait GpioRegistry {
    /// Whether `gpio` names a line the platform can provide (`gpio_is_valid`).
    fn is_valid(&self, gpio: GpioNum) -> bool;

    /// Claim exclusive use of `gpio` under `label` (`gpio_request`).
    fn request(&mut self, gpio: GpioNum, label: &'static str) -> Result;

    /// Return a claimed line to the platform (`gpio_free`).
    fn free(&mut self, gpio: GpioNum);

    /// Configure `gpio` as an output driving `initial` (`gpio_direction_output`).
    fn direction_output(&mut self, gpio: GpioNum, initial: PinState) -> Result;

    /// Expose `gpio` to user space through sysfs (`gpio_export`).
    ///
    /// With `direction_may_change == false` user space may drive the value
    /// but cannot flip the line to an input. Ownership stays with the caller.
    fn export(&mut self, gpio: GpioNum, direction_may_change: bool) -> Result;

    /// Remove the sysfs entry created by [`GpioRegistry::export`].
    fn unexport(&mut self, gpio: GpioNum);

    /// Drive an output line (`gpio_set_value`).
    fn set_value(&mut self, gpio: GpioNum, state: PinState);

    /// Read back the current value of a line (`gpio_get_value`).
    fn get_value(&self, gpio: GpioNum) -> PinState;
}
