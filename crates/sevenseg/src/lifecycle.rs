//! Ordered acquisition and release of the driver's kernel resources.
//!
//! ```text
//! region → cdev → class → node → validate lines → request lines → output + export
//! ```
//!
//! Each resource is pushed onto an undo stack the moment it is acquired. A
//! failure at any stage pops and releases exactly what is on the stack, last
//! acquired first; on success the stack moves into [`Resources`] and
//! [`Resources::release`] pops it the same way at unload.

use heapless::Vec;
use platform::{ClassId, DevNumber, GpioNum, Kernel};

use crate::config::{DriverConfig, DEVICE_COUNT, FIRST_MINOR, SEGMENT_COUNT};
use crate::display::SegmentLines;
use crate::error::InitError;

/// Region, cdev, class and node, plus one entry per segment line.
const UNDO_DEPTH: usize = SEGMENT_COUNT + 4;

// ── Undo records ─────────────────────────────────────────────────────────────

/// One acquired resource and what is needed to give it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Acquired {
    Region(DevNumber),
    Cdev(DevNumber),
    Class(ClassId),
    Node(ClassId, DevNumber),
    Line { gpio: GpioNum, exported: bool },
}

impl Acquired {
    fn release<K: Kernel + ?Sized>(self, kernel: &mut K) {
        match self {
            Self::Line { gpio, exported } => {
                if exported {
                    kernel.unexport(gpio);
                }
                kernel.free(gpio);
                tracing::debug!(gpio = %gpio, exported, "released line");
            }
            Self::Node(class, dev) => {
                kernel.device_destroy(class, dev);
                tracing::debug!(dev = %dev, "destroyed device node");
            }
            Self::Class(class) => {
                kernel.class_destroy(class);
                tracing::debug!(class = class.raw(), "destroyed class");
            }
            Self::Cdev(dev) => {
                kernel.cdev_del(dev);
                tracing::debug!(dev = %dev, "removed character device");
            }
            Self::Region(dev) => {
                kernel.unregister_region(dev, DEVICE_COUNT);
                tracing::debug!(dev = %dev, "released device number region");
            }
        }
    }
}

/// Stack of acquired resources, released last-in first-out.
#[derive(Debug, Default)]
struct UndoStack {
    entries: Vec<Acquired, UNDO_DEPTH>,
}

impl UndoStack {
    /// Record `item`. If the stack has no room the resource is handed back
    /// immediately and the caller sees `NoMemory`.
    fn push<K: Kernel + ?Sized>(
        &mut self,
        kernel: &mut K,
        item: Acquired,
    ) -> Result<(), platform::Error> {
        self.entries.push(item).map_err(|item| {
            item.release(kernel);
            platform::Error::NoMemory
        })
    }

    fn mark_exported(&mut self, line: GpioNum) {
        for entry in &mut self.entries {
            if let Acquired::Line { gpio, exported } = entry {
                if *gpio == line {
                    *exported = true;
                }
            }
        }
    }

    fn unwind<K: Kernel + ?Sized>(mut self, kernel: &mut K) {
        while let Some(item) = self.entries.pop() {
            item.release(kernel);
        }
    }

    /// Every entry acquired, in acquisition order.
    #[cfg(test)]
    fn entries(&self) -> &[Acquired] {
        &self.entries
    }
}

// ── Resources ────────────────────────────────────────────────────────────────

/// Everything a loaded driver holds.
///
/// Obtained from [`Resources::acquire`]; must be handed back with
/// [`Resources::release`].
#[derive(Debug)]
pub struct Resources {
    dev: DevNumber,
    class: ClassId,
    lines: SegmentLines,
    undo: UndoStack,
}

impl Resources {
    /// Acquire every resource in order, rolling back on the first failure.
    pub fn acquire<K: Kernel + ?Sized>(
        kernel: &mut K,
        config: &DriverConfig,
    ) -> Result<Self, InitError> {
        let mut undo = UndoStack::default();
        match Self::acquire_into(kernel, config, &mut undo) {
            Ok((dev, class, lines)) => Ok(Self {
                dev,
                class,
                lines,
                undo,
            }),
            Err(err) => {
                tracing::error!(error = %err, "load failed, rolling back");
                undo.unwind(kernel);
                Err(err)
            }
        }
    }

    fn acquire_into<K: Kernel + ?Sized>(
        kernel: &mut K,
        config: &DriverConfig,
        undo: &mut UndoStack,
    ) -> Result<(DevNumber, ClassId, SegmentLines), InitError> {
        // 1. device-number region
        let dev = kernel
            .alloc_region(FIRST_MINOR, DEVICE_COUNT, config.name)
            .map_err(InitError::AllocationFailed)?;
        undo.push(kernel, Acquired::Region(dev))
            .map_err(InitError::AllocationFailed)?;
        tracing::info!(
            major = dev.major(),
            minor = dev.minor(),
            name = config.name,
            "allocated device number"
        );

        // 2. character device
        kernel
            .cdev_add(dev, DEVICE_COUNT)
            .map_err(InitError::RegistrationFailed)?;
        undo.push(kernel, Acquired::Cdev(dev))
            .map_err(InitError::RegistrationFailed)?;

        // 3. class
        let class = kernel
            .class_create(config.name)
            .map_err(InitError::ClassCreationFailed)?;
        undo.push(kernel, Acquired::Class(class))
            .map_err(InitError::ClassCreationFailed)?;

        // 4. device node
        kernel
            .device_create(class, dev, config.name)
            .map_err(InitError::NodeCreationFailed)?;
        undo.push(kernel, Acquired::Node(class, dev))
            .map_err(InitError::NodeCreationFailed)?;

        // 5. validate every line before claiming any
        let lines = SegmentLines::contiguous(config.first_gpio)
            .ok_or(InitError::InvalidGpio(config.first_gpio))?;
        if let Some(bad) = lines.iter().find(|gpio| !kernel.is_valid(*gpio)) {
            return Err(InitError::InvalidGpio(bad));
        }

        // 6. claim, ascending
        for gpio in lines.iter() {
            kernel
                .request(gpio, config.name)
                .map_err(|cause| InitError::GpioClaimFailed { gpio, cause })?;
            undo.push(kernel, Acquired::Line { gpio, exported: false })
                .map_err(|cause| InitError::GpioClaimFailed { gpio, cause })?;
        }

        // 7. outputs driven low, then exported without direction changes
        for gpio in lines.iter() {
            kernel
                .direction_output(gpio, platform::PinState::Low)
                .map_err(|cause| InitError::GpioConfigFailed { gpio, cause })?;
        }
        for gpio in lines.iter() {
            kernel
                .export(gpio, false)
                .map_err(|cause| InitError::GpioConfigFailed { gpio, cause })?;
            undo.mark_exported(gpio);
        }

        Ok((dev, class, lines))
    }

    /// Release everything, last acquired first.
    pub fn release<K: Kernel + ?Sized>(self, kernel: &mut K) {
        tracing::debug!(dev = %self.dev, "releasing driver resources");
        self.undo.unwind(kernel);
    }

    /// Device number of the node.
    #[must_use]
    pub fn dev(&self) -> DevNumber {
        self.dev
    }

    /// Class the node lives in.
    #[must_use]
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// The claimed segment lines.
    #[must_use]
    pub fn lines(&self) -> &SegmentLines {
        &self.lines
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use platform::mocks::{Event, Fault, MockKernel, Resource, MOCK_MAJOR};
    use platform::GpioRegistry;

    use super::*;

    fn gpio(raw: u32) -> GpioNum {
        GpioNum::new(raw)
    }

    #[test]
    fn acquire_holds_everything() {
        let mut kernel = MockKernel::new();
        let resources = Resources::acquire(&mut kernel, &DriverConfig::default()).unwrap();

        assert_eq!(resources.dev(), DevNumber::new(MOCK_MAJOR, 0));
        assert_eq!(resources.undo.entries().len(), UNDO_DEPTH);
        // region, cdev, class, node, then 7 lines and 7 exports
        assert_eq!(kernel.held().len(), 4 + 2 * SEGMENT_COUNT);
        for raw in 7..=13 {
            assert!(kernel.is_held(Resource::Gpio(gpio(raw))));
            assert!(kernel.is_held(Resource::Export(gpio(raw))));
            assert_eq!(kernel.label(gpio(raw)), Some("7segs"));
        }
        assert_eq!(kernel.names(), ["7segs", "7segs", "7segs"]);
    }

    #[test]
    fn every_line_starts_low() {
        let mut kernel = MockKernel::new();
        let _resources = Resources::acquire(&mut kernel, &DriverConfig::default()).unwrap();
        let outputs: std::vec::Vec<_> = kernel
            .events()
            .iter()
            .filter(|event| matches!(event, Event::GpioOutput(..)))
            .collect();
        assert_eq!(outputs.len(), SEGMENT_COUNT);
        for raw in 7..=13 {
            assert_eq!(kernel.get_value(gpio(raw)), platform::PinState::Low);
        }
    }

    #[test]
    fn release_returns_to_empty_ledger() {
        let mut kernel = MockKernel::new();
        let resources = Resources::acquire(&mut kernel, &DriverConfig::default()).unwrap();
        kernel.clear_events();

        resources.release(&mut kernel);

        assert!(kernel.held().is_empty());
        assert!(kernel.bad_releases().is_empty());
        let dev = DevNumber::new(MOCK_MAJOR, 0);
        let events = kernel.events();
        assert_eq!(events.first(), Some(&Event::GpioUnexported(gpio(13))));
        assert_eq!(events[1], Event::GpioFreed(gpio(13)));
        assert_eq!(
            &events[events.len() - 4..],
            &[
                Event::DeviceDestroyed(dev),
                Event::ClassDestroyed(ClassId::from_raw(1)),
                Event::CdevRemoved(dev),
                Event::RegionReleased(dev),
            ]
        );
    }

    #[test]
    fn claim_failure_frees_claimed_lines_descending() {
        let mut kernel = MockKernel::new().failing(Fault::GpioRequest(gpio(10)));
        let err = Resources::acquire(&mut kernel, &DriverConfig::default()).unwrap_err();

        assert_eq!(
            err,
            InitError::GpioClaimFailed {
                gpio: gpio(10),
                cause: platform::Error::Busy,
            }
        );
        assert!(kernel.held().is_empty());
        assert!(kernel.bad_releases().is_empty());
        let freed: std::vec::Vec<_> = kernel
            .events()
            .iter()
            .filter_map(|event| match event {
                Event::GpioFreed(line) => Some(line.get()),
                _ => None,
            })
            .collect();
        assert_eq!(freed, [9, 8, 7]);
    }

    #[test]
    fn block_past_platform_is_invalid() {
        let mut kernel = MockKernel::new();
        let config = DriverConfig::new().with_first_gpio(gpio(50));
        let err = Resources::acquire(&mut kernel, &config).unwrap_err();

        assert_eq!(err, InitError::InvalidGpio(gpio(54)));
        assert!(kernel.held().is_empty());
        assert!(!kernel
            .events()
            .iter()
            .any(|event| matches!(event, Event::GpioRequested(_))));
    }

    #[test]
    fn export_failure_unexports_only_exported_lines() {
        let mut kernel = MockKernel::new().failing(Fault::GpioExport(gpio(9)));
        let err = Resources::acquire(&mut kernel, &DriverConfig::default()).unwrap_err();

        assert_eq!(
            err,
            InitError::GpioConfigFailed {
                gpio: gpio(9),
                cause: platform::Error::Busy,
            }
        );
        assert!(kernel.held().is_empty());
        assert!(kernel.bad_releases().is_empty());
    }
}
