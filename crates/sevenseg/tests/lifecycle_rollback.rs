//! Load/unload against the mock kernel: a failure at any acquisition stage
//! releases exactly the prefix acquired, last first, and unload releases
//! everything once.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

use platform::mocks::{Event, Fault, MockKernel, Resource, MOCK_MAJOR};
use platform::{ClassId, DevNumber, GpioNum};
use sevenseg::{DriverConfig, InitError, SevenSegDevice};

fn gpio(raw: u32) -> GpioNum {
    GpioNum::new(raw)
}

fn dev() -> DevNumber {
    DevNumber::new(MOCK_MAJOR, 0)
}

/// Events that acquire a resource, in the order the driver acquires them.
fn acquisitions(events: &[Event]) -> Vec<Resource> {
    events
        .iter()
        .filter_map(|event| match *event {
            Event::RegionAllocated(d) => Some(Resource::Region(d)),
            Event::CdevAdded(d) => Some(Resource::Cdev(d)),
            Event::ClassCreated(c) => Some(Resource::Class(c)),
            Event::DeviceCreated(d) => Some(Resource::Device(d)),
            Event::GpioRequested(g) => Some(Resource::Gpio(g)),
            Event::GpioExported(g) => Some(Resource::Export(g)),
            _ => None,
        })
        .collect()
}

/// Events that release a resource, in the order the driver releases them.
fn releases(events: &[Event]) -> Vec<Resource> {
    events
        .iter()
        .filter_map(|event| match *event {
            Event::RegionReleased(d) => Some(Resource::Region(d)),
            Event::CdevRemoved(d) => Some(Resource::Cdev(d)),
            Event::ClassDestroyed(c) => Some(Resource::Class(c)),
            Event::DeviceDestroyed(d) => Some(Resource::Device(d)),
            Event::GpioFreed(g) => Some(Resource::Gpio(g)),
            Event::GpioUnexported(g) => Some(Resource::Export(g)),
            _ => None,
        })
        .collect()
}

/// Load with `fault` injected; return the error and the kernel afterwards.
fn load_failing(fault: Fault) -> (InitError, MockKernel) {
    let device = SevenSegDevice::new(MockKernel::new().failing(fault), DriverConfig::default());
    let err = device.load().unwrap_err();
    assert!(!device.is_loaded());
    (err, device.into_kernel())
}

/// The ledger is empty and every acquisition was released exactly once.
fn assert_clean_rollback(kernel: &MockKernel) {
    assert!(kernel.held().is_empty(), "leaked: {:?}", kernel.held());
    assert!(kernel.bad_releases().is_empty());
    let acquired = acquisitions(kernel.events());
    let released = releases(kernel.events());
    assert_eq!(acquired.len(), released.len());
    for resource in &acquired {
        assert_eq!(released.iter().filter(|r| *r == resource).count(), 1);
    }
}

#[test]
fn allocation_failure_touches_nothing() {
    let (err, kernel) = load_failing(Fault::AllocRegion);
    assert_eq!(err, InitError::AllocationFailed(platform::Error::Busy));
    assert!(kernel.events().is_empty());
    assert_clean_rollback(&kernel);
}

#[test]
fn registration_failure_releases_region() {
    let (err, kernel) = load_failing(Fault::CdevAdd);
    assert_eq!(err, InitError::RegistrationFailed(platform::Error::Busy));
    assert_eq!(
        kernel.events(),
        &[Event::RegionAllocated(dev()), Event::RegionReleased(dev())]
    );
    assert_clean_rollback(&kernel);
}

#[test]
fn class_failure_releases_cdev_then_region() {
    let (err, kernel) = load_failing(Fault::ClassCreate);
    assert_eq!(
        err,
        InitError::ClassCreationFailed(platform::Error::AlreadyExists)
    );
    assert_eq!(
        kernel.events(),
        &[
            Event::RegionAllocated(dev()),
            Event::CdevAdded(dev()),
            Event::CdevRemoved(dev()),
            Event::RegionReleased(dev()),
        ]
    );
    assert_clean_rollback(&kernel);
}

#[test]
fn node_failure_releases_class_cdev_region() {
    let (err, kernel) = load_failing(Fault::DeviceCreate);
    assert_eq!(err, InitError::NodeCreationFailed(platform::Error::NoMemory));
    let class = ClassId::from_raw(1);
    assert_eq!(
        kernel.events(),
        &[
            Event::RegionAllocated(dev()),
            Event::CdevAdded(dev()),
            Event::ClassCreated(class),
            Event::ClassDestroyed(class),
            Event::CdevRemoved(dev()),
            Event::RegionReleased(dev()),
        ]
    );
    assert_clean_rollback(&kernel);
}

#[test]
fn invalid_line_claims_nothing() {
    let (err, kernel) = load_failing(Fault::InvalidGpio(gpio(12)));
    assert_eq!(err, InitError::InvalidGpio(gpio(12)));
    let class = ClassId::from_raw(1);
    assert_eq!(
        releases(kernel.events()),
        [
            Resource::Device(dev()),
            Resource::Class(class),
            Resource::Cdev(dev()),
            Resource::Region(dev()),
        ]
    );
    assert!(!kernel
        .events()
        .iter()
        .any(|e| matches!(e, Event::GpioRequested(_))));
    assert_clean_rollback(&kernel);
}

#[test]
fn claim_failure_on_each_line() {
    for raw in 7..=13 {
        let (err, kernel) = load_failing(Fault::GpioRequest(gpio(raw)));
        assert_eq!(
            err,
            InitError::GpioClaimFailed {
                gpio: gpio(raw),
                cause: platform::Error::Busy,
            }
        );
        let freed: Vec<u32> = releases(kernel.events())
            .into_iter()
            .filter_map(|r| match r {
                Resource::Gpio(g) => Some(g.get()),
                _ => None,
            })
            .collect();
        let expected: Vec<u32> = (7..raw).rev().collect();
        assert_eq!(freed, expected, "failing line {raw}");
        assert_clean_rollback(&kernel);
    }
}

#[test]
fn direction_failure_frees_all_lines() {
    let (err, kernel) = load_failing(Fault::GpioDirection(gpio(11)));
    assert_eq!(
        err,
        InitError::GpioConfigFailed {
            gpio: gpio(11),
            cause: platform::Error::InvalidArgs,
        }
    );
    let released = releases(kernel.events());
    assert_eq!(released.len(), 7 + 4);
    assert!(!released.iter().any(|r| matches!(r, Resource::Export(_))));
    assert_clean_rollback(&kernel);
}

#[test]
fn export_failure_unexports_what_was_exported() {
    let (err, kernel) = load_failing(Fault::GpioExport(gpio(13)));
    assert_eq!(
        err,
        InitError::GpioConfigFailed {
            gpio: gpio(13),
            cause: platform::Error::Busy,
        }
    );
    let unexported: Vec<u32> = releases(kernel.events())
        .into_iter()
        .filter_map(|r| match r {
            Resource::Export(g) => Some(g.get()),
            _ => None,
        })
        .collect();
    assert_eq!(unexported, [12, 11, 10, 9, 8, 7]);
    assert_clean_rollback(&kernel);
}

#[test]
fn unload_is_strict_reverse_of_load() {
    let device = SevenSegDevice::new(MockKernel::new(), DriverConfig::default());
    device.load().unwrap();
    let kernel = device.into_kernel();

    let class = ClassId::from_raw(1);
    let mut expected = vec![
        Resource::Region(dev()),
        Resource::Cdev(dev()),
        Resource::Class(class),
        Resource::Device(dev()),
    ];
    expected.extend((7..=13).map(|raw| Resource::Gpio(gpio(raw))));
    expected.extend((7..=13).map(|raw| Resource::Export(gpio(raw))));
    assert_eq!(acquisitions(kernel.events()), expected);

    let mut reverse = Vec::new();
    for raw in (7..=13).rev() {
        reverse.push(Resource::Export(gpio(raw)));
        reverse.push(Resource::Gpio(gpio(raw)));
    }
    reverse.extend([
        Resource::Device(dev()),
        Resource::Class(class),
        Resource::Cdev(dev()),
        Resource::Region(dev()),
    ]);
    assert_eq!(releases(kernel.events()), reverse);
    assert!(kernel.held().is_empty());
    assert!(kernel.bad_releases().is_empty());
}

#[test]
fn reload_after_unload() {
    let device = SevenSegDevice::new(MockKernel::new(), DriverConfig::default());
    device.load().unwrap();
    device.unload();
    device.load().unwrap();
    assert!(device.is_loaded());
    let kernel = device.into_kernel();
    assert!(kernel.held().is_empty());
    assert!(kernel.bad_releases().is_empty());
}

#[test]
fn failed_load_can_be_retried_after_fault_clears() {
    let mut device = SevenSegDevice::new(
        MockKernel::new().failing(Fault::GpioRequest(gpio(8))),
        DriverConfig::default(),
    );
    assert!(device.load().is_err());
    device.kernel_mut().clear_faults();
    device.load().unwrap();
    assert_eq!(device.with_kernel(|k| k.held().len()), 4 + 14);
}
