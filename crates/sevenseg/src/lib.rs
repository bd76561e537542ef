//! Character-device driver for a single 7-segment display
//!
//! User space writes one ASCII digit to `/dev/7segs` and the matching
//! segments light up; reading the node returns the digit on display.
//!
//! # Architecture
//!
//! ```text
//! open/read/write/release (platform::FileOperations)
//!         ↓
//! SegmentDevice (device) ── parse ── segment::DIGIT_TABLE
//!         ↓                     ↓
//! lifecycle::Resources     display::SegmentLines
//!         ↓                     ↓
//! platform::Kernel (chrdev, device model, GPIO)
//! ```
//!
//! # Features
//!
//! - `std`: host mocks from `platform` and `std::error::Error` impls
//! - `defmt`: `defmt::Format` on every public value type
//!
//! # Example
//!
//! ```no_run
//! use platform::{FileOperations, OpenFile, UserSliceReader};
//! use sevenseg::{IoError, SevenSegDevice};
//!
//! fn show_five<K: platform::Kernel, R: UserSliceReader>(
//!     device: &SevenSegDevice<K>,
//!     payload: &mut R,
//! ) -> Result<usize, IoError> {
//!     device.write(&OpenFile::new(0), payload, 0)
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
#![allow(clippy::doc_markdown)] // kernel names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod config;
pub mod device;
pub mod display;
pub mod error;
pub mod lifecycle;
pub mod module;
pub mod parse;
pub mod segment;

pub use config::{BootDisplay, DriverConfig, DRIVER_NAME, SEGMENT_COUNT};
pub use device::{SegmentDevice, SevenSegDevice};
pub use display::SegmentLines;
pub use error::{InitError, IoError};
pub use lifecycle::Resources;
pub use module::{ModuleInfo, SevenSegModule, MODULE_INFO};
pub use segment::{Digit, SegmentPattern, DIGIT_TABLE};
