//! File operations dispatched by the VFS.
//!
//! The VFS calls into a driver through a fixed table of entry points. Each
//! call that returns a byte count follows the `ssize_t` convention: a
//! non-negative count on success, a negative errno on failure.

use crate::uaccess::{UserSliceReader, UserSliceWriter};

/// Handle for one open file description on a device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OpenFile {
    session: u64,
}

impl OpenFile {
    /// Handle for session `session`.
    #[must_use]
    pub const fn new(session: u64) -> Self {
        Self { session }
    }

    /// Session identifier assigned by the VFS.
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }
}

/// Errors that can be reported to user space as an errno.
pub trait ToErrno {
    /// Negative Linux errno.
    fn to_errno(&self) -> i32;
}

impl ToErrno for crate::Error {
    fn to_errno(&self) -> i32 {
        crate::Error::to_errno(*self)
    }
}

/// Driver entry points for a character device.
///
/// One instance serves every open file on the node; implementations must be
/// safe to call concurrently from independent sessions.
pub trait FileOperations {
    /// Error reported by the entry points.
    type Error: ToErrno;

    /// A session opened the node.
    fn open(&self, file: &OpenFile) -> Result<(), Self::Error>;

    /// A session closed its last reference to the node.
    fn release(&self, file: &OpenFile);

    /// Fill `writer` and return the number of bytes produced.
    fn read<W>(&self, file: &OpenFile, writer: &mut W, offset: u64) -> Result<usize, Self::Error>
    where
        W: UserSliceWriter + ?Sized;

    /// Consume `reader` and return the number of bytes accepted.
    fn write<R>(&self, file: &OpenFile, reader: &mut R, offset: u64) -> Result<usize, Self::Error>
    where
        R: UserSliceReader + ?Sized;
}

/// Collapse an entry-point result into the `ssize_t` value seen by user space.
#[must_use]
pub fn to_ssize<E: ToErrno>(result: Result<usize, E>) -> isize {
    match result {
        Ok(count) => isize::try_from(count).unwrap_or(isize::MAX),
        Err(err) => {
            // errno values are small negatives; i32 always fits isize on the
            // targets this driver builds for.
            isize::try_from(err.to_errno()).unwrap_or(isize::MIN)
        }
    }
}
