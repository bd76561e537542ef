//! Driver error types.
//!
//! [`InitError`] covers the load path; every variant names the stage that
//! failed and, where a collaborator reported it, the underlying
//! [`platform::Error`]. [`IoError`] covers `read`/`write` and maps onto the
//! errno returned to user space.

use platform::{GpioNum, ToErrno};
use thiserror_no_std::Error as ThisError;

/// Load failure. Everything acquired before the failing stage has already
/// been released when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The device-number region could not be reserved.
    #[error("device number allocation failed: {0}")]
    AllocationFailed(platform::Error),

    /// The character device could not be added to the cdev table.
    #[error("character device registration failed: {0}")]
    RegistrationFailed(platform::Error),

    /// The device class could not be created.
    #[error("device class creation failed: {0}")]
    ClassCreationFailed(platform::Error),

    /// The device node could not be created.
    #[error("device node creation failed: {0}")]
    NodeCreationFailed(platform::Error),

    /// A segment line is not usable on this platform.
    #[error("{0} is not a valid GPIO")]
    InvalidGpio(GpioNum),

    /// A segment line could not be requested.
    #[error("requesting {gpio} failed: {cause}")]
    GpioClaimFailed {
        /// Line whose request failed.
        gpio: GpioNum,
        /// Collaborator error.
        cause: platform::Error,
    },

    /// A requested line could not be set to output or exported.
    #[error("configuring {gpio} failed: {cause}")]
    GpioConfigFailed {
        /// Line whose configuration failed.
        gpio: GpioNum,
        /// Collaborator error.
        cause: platform::Error,
    },

    /// `load` called on a driver that is already Ready.
    #[error("driver already loaded")]
    AlreadyLoaded,
}

impl InitError {
    /// Negative errno reported as the module init return value.
    #[must_use]
    pub const fn to_errno(self) -> i32 {
        match self {
            Self::AllocationFailed(cause)
            | Self::RegistrationFailed(cause)
            | Self::ClassCreationFailed(cause)
            | Self::NodeCreationFailed(cause)
            | Self::GpioClaimFailed { cause, .. }
            | Self::GpioConfigFailed { cause, .. } => cause.to_errno(),
            Self::InvalidGpio(_) => platform::Error::NoDevice.to_errno(),
            Self::AlreadyLoaded => platform::Error::Busy.to_errno(),
        }
    }
}

/// `read`/`write` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Copy from or to user memory failed.
    #[error("bad user address")]
    CopyFault,

    /// Payload is not a decimal integer, or is longer than the write buffer.
    #[error("payload is not a decimal integer")]
    InvalidFormat,

    /// Payload parsed but is not a single digit.
    ///
    /// Carries the parsed value, saturated to the `i64` range on overflow.
    #[error("{0} is outside 0..=9")]
    OutOfRange(i64),

    /// The driver is not loaded.
    #[error("driver not loaded")]
    NotReady,
}

impl ToErrno for IoError {
    fn to_errno(&self) -> i32 {
        match self {
            Self::CopyFault => -14,
            Self::InvalidFormat => -22,
            Self::OutOfRange(_) => -34,
            Self::NotReady => -19,
        }
    }
}
