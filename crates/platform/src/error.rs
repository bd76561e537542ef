//! Kernel collaborator error type.
//!
//! Every registry call that can fail in the host kernel reports one of these
//! values. They mirror the errno codes the corresponding kernel primitives
//! return, so a driver can hand them back to user space unchanged.

use thiserror_no_std::Error as ThisError;

/// A [`Result`] with a platform [`Error`].
pub type Result<T = ()> = core::result::Result<T, Error>;

/// Failure reported by a kernel collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Allocation failed (`ENOMEM`).
    #[error("out of memory")]
    NoMemory,
    /// Resource is held by someone else (`EBUSY`).
    #[error("resource busy")]
    Busy,
    /// Argument rejected by the collaborator (`EINVAL`).
    #[error("invalid argument")]
    InvalidArgs,
    /// No such device or resource (`ENODEV`).
    #[error("no such device")]
    NoDevice,
    /// User memory could not be accessed (`EFAULT`).
    #[error("bad address")]
    Fault,
    /// A resource with the same name already exists (`EEXIST`).
    #[error("already exists")]
    AlreadyExists,
}

impl Error {
    /// Negative Linux errno for this error, as returned to user space.
    #[must_use]
    pub const fn to_errno(self) -> i32 {
        match self {
            Self::NoMemory => -12,
            Self::Busy => -16,
            Self::InvalidArgs => -22,
            Self::NoDevice => -19,
            Self::Fault => -14,
            Self::AlreadyExists => -17,
        }
    }
}
