//! Loadable-module wrapper: metadata, init and exit.

use embassy_sync::blocking_mutex::raw::RawMutex;
use platform::Kernel;

use crate::config::{DriverConfig, DRIVER_NAME};
use crate::device::SegmentDevice;
use crate::error::InitError;

/// Module metadata as reported by `modinfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleInfo {
    /// Module and device name.
    pub name: &'static str,
    /// License string the kernel checks for symbol access.
    pub license: &'static str,
    /// Author.
    pub author: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Module version.
    pub version: &'static str,
}

/// Metadata for the `7segs` module.
pub const MODULE_INFO: ModuleInfo = ModuleInfo {
    name: DRIVER_NAME,
    license: "GPL",
    author: "Soporte Tecnico",
    description: "Driver for a 7-segment display",
    version: "0.1",
};

/// A loaded module. Dropping it runs the exit path.
pub struct SevenSegModule<M: RawMutex, K: Kernel> {
    device: SegmentDevice<M, K>,
}

impl<M: RawMutex, K: Kernel> SevenSegModule<M, K> {
    /// Module init: build the device and load it.
    pub fn init(kernel: K, config: DriverConfig) -> Result<Self, InitError> {
        tracing::info!(
            name = MODULE_INFO.name,
            version = MODULE_INFO.version,
            "module init"
        );
        let device = SegmentDevice::new(kernel, config);
        if let Err(err) = device.load() {
            tracing::error!(error = %err, errno = err.to_errno(), "module init failed");
            return Err(err);
        }
        Ok(Self { device })
    }

    /// The device the VFS dispatches into.
    pub fn device(&self) -> &SegmentDevice<M, K> {
        &self.device
    }

    /// Mutable access to the device.
    pub fn device_mut(&mut self) -> &mut SegmentDevice<M, K> {
        &mut self.device
    }
}

impl<M: RawMutex, K: Kernel> Drop for SevenSegModule<M, K> {
    fn drop(&mut self) {
        tracing::info!(name = MODULE_INFO.name, "module exit");
        self.device.unload();
    }
}
