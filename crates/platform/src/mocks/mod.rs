//! Mock implementations for testing
//!
//! This module provides a simulated host kernel implementing every
//! collaborator trait, plus user-buffer doubles, for use in unit and
//! integration tests and in host tooling.
//!
//! [`MockKernel`] records every call in an event journal, keeps a ledger of
//! the resources currently held, flags releases of resources that were never
//! acquired (or were already released), and can be told to fail any single
//! acquisition step.

#![cfg(any(test, feature = "std"))]

extern crate std;

use core::cell::Cell;
use std::collections::BTreeMap;
use std::vec::Vec;

use crate::chrdev::{ChrdevRegistry, DevNumber};
use crate::device::{ClassId, DeviceModel};
use crate::error::{Error, Result};
use crate::gpio::{GpioNum, GpioRegistry, PinState};
use crate::uaccess::{UserSliceReader, UserSliceWriter};

/// Highest GPIO number the mock platform accepts (BCM2835 has 54 lines).
pub const MOCK_GPIO_MAX: u32 = 53;

/// Major number handed out by [`MockKernel::new`].
pub const MOCK_MAJOR: u32 = 240;

/// Every call made against the mock, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// `alloc_region` succeeded.
    RegionAllocated(DevNumber),
    /// `unregister_region` called.
    RegionReleased(DevNumber),
    /// `cdev_add` succeeded.
    CdevAdded(DevNumber),
    /// `cdev_del` called.
    CdevRemoved(DevNumber),
    /// `class_create` succeeded.
    ClassCreated(ClassId),
    /// `class_destroy` called.
    ClassDestroyed(ClassId),
    /// `device_create` succeeded.
    DeviceCreated(DevNumber),
    /// `device_destroy` called.
    DeviceDestroyed(DevNumber),
    /// `request` succeeded.
    GpioRequested(GpioNum),
    /// `free` called.
    GpioFreed(GpioNum),
    /// `direction_output` succeeded.
    GpioOutput(GpioNum, PinState),
    /// `export` succeeded.
    GpioExported(GpioNum),
    /// `unexport` called.
    GpioUnexported(GpioNum),
    /// `set_value` called.
    GpioSet(GpioNum, PinState),
}

/// A resource the mock considers held by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Reserved device-number region.
    Region(DevNumber),
    /// Live character device.
    Cdev(DevNumber),
    /// Device class.
    Class(ClassId),
    /// Device node.
    Device(DevNumber),
    /// Requested GPIO line.
    Gpio(GpioNum),
    /// Sysfs export of a GPIO line.
    Export(GpioNum),
}

/// A single acquisition step the mock can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `alloc_region` returns `Busy`.
    AllocRegion,
    /// `cdev_add` returns `Busy`.
    CdevAdd,
    /// `class_create` returns `AlreadyExists`.
    ClassCreate,
    /// `device_create` returns `NoMemory`.
    DeviceCreate,
    /// `is_valid` reports the line as unusable.
    InvalidGpio(GpioNum),
    /// `request` returns `Busy` for the line.
    GpioRequest(GpioNum),
    /// `direction_output` returns `InvalidArgs` for the line.
    GpioDirection(GpioNum),
    /// `export` returns `Busy` for the line.
    GpioExport(GpioNum),
}

/// Simulated host kernel.
#[derive(Debug)]
pub struct MockKernel {
    major: u32,
    next_class: u32,
    faults: Vec<Fault>,
    events: Vec<Event>,
    held: Vec<Resource>,
    bad_releases: Vec<Resource>,
    values: BTreeMap<GpioNum, PinState>,
    labels: BTreeMap<GpioNum, &'static str>,
    names: Vec<&'static str>,
    readbacks: Cell<usize>,
}

impl MockKernel {
    /// Create a mock kernel with no injected faults.
    pub fn new() -> Self {
        Self::with_major(MOCK_MAJOR)
    }

    /// Create a mock kernel that allocates regions under `major`.
    pub fn with_major(major: u32) -> Self {
        Self {
            major,
            next_class: 1,
            faults: Vec::new(),
            events: Vec::new(),
            held: Vec::new(),
            bad_releases: Vec::new(),
            values: BTreeMap::new(),
            labels: BTreeMap::new(),
            names: Vec::new(),
            readbacks: Cell::new(0),
        }
    }

    /// Builder form of [`MockKernel::inject`].
    #[must_use]
    pub fn failing(mut self, fault: Fault) -> Self {
        self.inject(fault);
        self
    }

    /// Make the matching acquisition step fail from now on.
    pub fn inject(&mut self, fault: Fault) {
        self.faults.push(fault);
    }

    /// Remove every injected fault.
    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    /// Event journal.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Forget the journal recorded so far.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Resources currently held, in acquisition order.
    pub fn held(&self) -> &[Resource] {
        &self.held
    }

    /// Whether `resource` is currently held.
    pub fn is_held(&self, resource: Resource) -> bool {
        self.held.contains(&resource)
    }

    /// Releases of resources that were not held at the time.
    pub fn bad_releases(&self) -> &[Resource] {
        &self.bad_releases
    }

    /// Current value of `gpio`, `Low` if never driven.
    pub fn value(&self, gpio: GpioNum) -> PinState {
        self.values.get(&gpio).copied().unwrap_or_default()
    }

    /// Number of `get_value` calls made through [`GpioRegistry`].
    pub fn readbacks(&self) -> usize {
        self.readbacks.get()
    }

    /// Values of `count` consecutive lines starting at `first`.
    pub fn values(&self, first: GpioNum, count: u32) -> Vec<PinState> {
        (0..count)
            .filter_map(|i| first.offset(i))
            .map(|gpio| self.value(gpio))
            .collect()
    }

    /// Label `gpio` was requested under, if it is held.
    pub fn label(&self, gpio: GpioNum) -> Option<&'static str> {
        self.labels.get(&gpio).copied()
    }

    /// Names passed to `alloc_region`, `class_create` and `device_create`.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    fn faulted(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }

    fn acquire(&mut self, resource: Resource, event: Event) {
        self.held.push(resource);
        self.events.push(event);
    }

    fn release(&mut self, resource: Resource, event: Event) {
        self.events.push(event);
        match self.held.iter().position(|held| *held == resource) {
            Some(index) => {
                self.held.remove(index);
            }
            None => self.bad_releases.push(resource),
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChrdevRegistry for MockKernel {
    fn alloc_region(
        &mut self,
        first_minor: u32,
        _count: u32,
        name: &'static str,
    ) -> Result<DevNumber> {
        if self.faulted(Fault::AllocRegion) {
            return Err(Error::Busy);
        }
        let dev = DevNumber::new(self.major, first_minor);
        self.names.push(name);
        self.acquire(Resource::Region(dev), Event::RegionAllocated(dev));
        Ok(dev)
    }

    fn unregister_region(&mut self, dev: DevNumber, _count: u32) {
        self.release(Resource::Region(dev), Event::RegionReleased(dev));
    }

    fn cdev_add(&mut self, dev: DevNumber, _count: u32) -> Result {
        if self.faulted(Fault::CdevAdd) {
            return Err(Error::Busy);
        }
        self.acquire(Resource::Cdev(dev), Event::CdevAdded(dev));
        Ok(())
    }

    fn cdev_del(&mut self, dev: DevNumber) {
        self.release(Resource::Cdev(dev), Event::CdevRemoved(dev));
    }
}

impl DeviceModel for MockKernel {
    fn class_create(&mut self, name: &'static str) -> Result<ClassId> {
        if self.faulted(Fault::ClassCreate) {
            return Err(Error::AlreadyExists);
        }
        let class = ClassId::from_raw(self.next_class);
        self.next_class = self.next_class.wrapping_add(1);
        self.names.push(name);
        self.acquire(Resource::Class(class), Event::ClassCreated(class));
        Ok(class)
    }

    fn class_destroy(&mut self, class: ClassId) {
        self.release(Resource::Class(class), Event::ClassDestroyed(class));
    }

    fn device_create(&mut self, class: ClassId, dev: DevNumber, name: &'static str) -> Result {
        if self.faulted(Fault::DeviceCreate) {
            return Err(Error::NoMemory);
        }
        if !self.is_held(Resource::Class(class)) {
            return Err(Error::InvalidArgs);
        }
        self.names.push(name);
        self.acquire(Resource::Device(dev), Event::DeviceCreated(dev));
        Ok(())
    }

    fn device_destroy(&mut self, _class: ClassId, dev: DevNumber) {
        self.release(Resource::Device(dev), Event::DeviceDestroyed(dev));
    }
}

impl GpioRegistry for MockKernel {
    fn is_valid(&self, gpio: GpioNum) -> bool {
        gpio.get() <= MOCK_GPIO_MAX && !self.faulted(Fault::InvalidGpio(gpio))
    }

    fn request(&mut self, gpio: GpioNum, label: &'static str) -> Result {
        if !self.is_valid(gpio) {
            return Err(Error::InvalidArgs);
        }
        if self.faulted(Fault::GpioRequest(gpio)) || self.is_held(Resource::Gpio(gpio)) {
            return Err(Error::Busy);
        }
        self.labels.insert(gpio, label);
        self.acquire(Resource::Gpio(gpio), Event::GpioRequested(gpio));
        Ok(())
    }

    fn free(&mut self, gpio: GpioNum) {
        self.labels.remove(&gpio);
        self.release(Resource::Gpio(gpio), Event::GpioFreed(gpio));
    }

    fn direction_output(&mut self, gpio: GpioNum, initial: PinState) -> Result {
        if self.faulted(Fault::GpioDirection(gpio)) || !self.is_held(Resource::Gpio(gpio)) {
            return Err(Error::InvalidArgs);
        }
        self.values.insert(gpio, initial);
        self.events.push(Event::GpioOutput(gpio, initial));
        Ok(())
    }

    fn export(&mut self, gpio: GpioNum, _direction_may_change: bool) -> Result {
        if self.faulted(Fault::GpioExport(gpio)) || !self.is_held(Resource::Gpio(gpio)) {
            return Err(Error::Busy);
        }
        self.acquire(Resource::Export(gpio), Event::GpioExported(gpio));
        Ok(())
    }

    fn unexport(&mut self, gpio: GpioNum) {
        self.release(Resource::Export(gpio), Event::GpioUnexported(gpio));
    }

    fn set_value(&mut self, gpio: GpioNum, state: PinState) {
        self.values.insert(gpio, state);
        self.events.push(Event::GpioSet(gpio, state));
    }

    fn get_value(&self, gpio: GpioNum) -> PinState {
        self.readbacks.set(self.readbacks.get().saturating_add(1));
        self.value(gpio)
    }
}

/// User buffer a driver reads from during `write`.
#[derive(Debug, Clone)]
pub struct MockUserReader {
    data: Vec<u8>,
    pos: usize,
    fault: bool,
}

impl MockUserReader {
    /// Buffer holding `data`.
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            fault: false,
        }
    }

    /// Buffer of `data.len()` bytes whose address is not mapped.
    pub fn faulting(data: &[u8]) -> Self {
        Self {
            fault: true,
            ..Self::new(data)
        }
    }
}

impl UserSliceReader for MockUserReader {
    fn len(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_slice(&mut self, out: &mut [u8]) -> Result {
        if self.fault {
            return Err(Error::Fault);
        }
        let end = self.pos.checked_add(out.len()).ok_or(Error::Fault)?;
        let src = self.data.get(self.pos..end).ok_or(Error::Fault)?;
        out.copy_from_slice(src);
        self.pos = end;
        Ok(())
    }
}

/// User buffer a driver writes into during `read`.
#[derive(Debug, Clone)]
pub struct MockUserWriter {
    capacity: usize,
    written: Vec<u8>,
    fault: bool,
}

impl MockUserWriter {
    /// Buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            written: Vec::new(),
            fault: false,
        }
    }

    /// Buffer of `capacity` bytes whose address is not mapped.
    pub fn faulting(capacity: usize) -> Self {
        Self {
            fault: true,
            ..Self::with_capacity(capacity)
        }
    }

    /// Bytes the driver copied in.
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl UserSliceWriter for MockUserWriter {
    fn len(&self) -> usize {
        self.capacity.saturating_sub(self.written.len())
    }

    fn write_slice(&mut self, data: &[u8]) -> Result {
        if self.fault || data.len() > self.len() {
            return Err(Error::Fault);
        }
        self.written.extend_from_slice(data);
        Ok(())
    }
}
