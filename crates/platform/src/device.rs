//! Device model: classes and device nodes.
//!
//! A class groups devices under `/sys/class/<name>`; creating a device in a
//! class at a given device number is what makes udev create the node under
//! `/dev`.

use crate::chrdev::DevNumber;
use crate::error::Result;

/// Opaque handle to a class created by [`DeviceModel::class_create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassId(u32);

impl ClassId {
    /// Wrap a raw handle value handed out by a [`DeviceModel`].
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Class and device-node registry.
pub trait DeviceModel {
    /// Create a device class (`class_create`).
    fn class_create(&mut self, name: &'static str) -> Result<ClassId>;

    /// Destroy a class created with [`DeviceModel::class_create`].
    fn class_destroy(&mut self, class: ClassId);

    /// Create the device node `name` in `class` for `dev` (`device_create`).
    fn device_create(&mut self, class: ClassId, dev: DevNumber, name: &'static str) -> Result;

    /// Destroy the device node for `dev` in `class` (`device_destroy`).
    fn device_destroy(&mut self, class: ClassId, dev: DevNumber);
}
