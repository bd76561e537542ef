//! User-space memory access.
//!
//! Buffers handed to `read`/`write` live in the caller's address space and
//! may be unmapped at any point. Every transfer either succeeds completely or
//! fails with [`Error::Fault`](crate::Error::Fault).

use crate::error::Result;

/// A user buffer the driver copies *from* during `write`.
pub trait UserSliceReader {
    /// Number of bytes left to be read.
    ///
    /// Note that even reading less than this number of bytes may fail.
    fn len(&self) -> usize;

    /// Returns `true` if no data is available.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `data.len()` bytes out of user space (`copy_from_user`).
    ///
    /// Returns `Fault` if `data` is larger than the remaining length or the
    /// user address is not mapped and readable.
    fn read_slice(&mut self, data: &mut [u8]) -> Result;
}

/// A user buffer the driver copies *into* during `read`.
pub trait UserSliceWriter {
    /// Number of bytes that can still be written.
    fn len(&self) -> usize;

    /// Returns `true` if the buffer cannot hold any more data.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `data` into user space (`copy_to_user`).
    ///
    /// Returns `Fault` if `data` is larger than the remaining length or the
    /// user address is not mapped and writable.
    fn write_slice(&mut self, data: &[u8]) -> Result;
}
