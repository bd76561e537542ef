//! Host-kernel collaborator layer for the `7segs` driver
//!
//! This crate provides trait-based abstractions for every kernel service a
//! character-device GPIO driver depends on, enabling development and testing
//! without a kernel build or physical pins.
//!
//! # Architecture Layers
//!
//! ```text
//! User space (open/read/write/close on /dev/7segs)
//!         ↓
//! VFS dispatch ([`FileOperations`])
//!         ↓
//! Driver (sevenseg crate)
//!         ↓
//! Collaborator traits (this crate)
//!         ↓
//! Host kernel (chrdev, device model, gpiolib, uaccess)
//! ```
//!
//! # Collaborators
//!
//! - [`ChrdevRegistry`] - device-number regions and the cdev table
//! - [`DeviceModel`] - classes and device nodes
//! - [`GpioRegistry`] - integer-addressed GPIO lines
//! - [`UserSliceReader`] / [`UserSliceWriter`] - user-memory copies
//! - [`FileOperations`] - the entry points the VFS calls
//!
//! # Features
//!
//! - `std`: host mocks in [`mocks`] and `std::error::Error` impls
//! - `defmt`: `defmt::Format` on every value type
//!
//! # Example
//!
//! ```no_run
//! use platform::{GpioNum, GpioRegistry, PinState};
//!
//! fn blank<G: GpioRegistry>(gpio: &mut G) {
//!     for raw in 7..=13 {
//!         gpio.set_value(GpioNum::new(raw), PinState::Low);
//!     }
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this kernel boundary crate:
#![allow(clippy::doc_markdown)] // kernel function names in doc comments
#![allow(clippy::must_use_candidate)] // accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod chrdev;
pub mod device;
pub mod error;
pub mod file;
pub mod gpio;
pub mod mocks;
pub mod uaccess;

pub use chrdev::{ChrdevRegistry, DevNumber};
pub use device::{ClassId, DeviceModel};
pub use error::{Error, Result};
pub use file::{to_ssize, FileOperations, OpenFile, ToErrno};
pub use gpio::{GpioNum, GpioRegistry, PinState};
pub use uaccess::{UserSliceReader, UserSliceWriter};

/// Every kernel service the driver's load/unload path touches.
pub trait Kernel: ChrdevRegistry + DeviceModel + GpioRegistry {}

impl<T: ChrdevRegistry + DeviceModel + GpioRegistry> Kernel for T {}
