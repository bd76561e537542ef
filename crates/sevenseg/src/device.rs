//! The `7segs` character device.
//!
//! [`SegmentDevice`] owns the kernel collaborators and the display state
//! behind one blocking mutex. A `write` validates its payload without the
//! lock, then takes it once to drive all seven lines and record the digit,
//! so readers never observe a half-applied pattern. User copies happen
//! outside the lock.
//!
//! ```text
//! Unloaded --load()--> Ready --(open|release|read|write)*--> Ready --unload()--> Unloaded
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;
use platform::{FileOperations, Kernel, OpenFile, UserSliceReader, UserSliceWriter};

use crate::config::{BootDisplay, DriverConfig, WRITE_BUFFER_CAPACITY};
use crate::error::{InitError, IoError};
use crate::lifecycle::Resources;
use crate::parse::{parse_decimal, ParseError};
use crate::segment::{Digit, SegmentPattern};

/// [`SegmentDevice`] locked by a critical section, usable from any context.
pub type SevenSegDevice<K> = SegmentDevice<CriticalSectionRawMutex, K>;

enum State {
    Unloaded,
    Ready { resources: Resources, current: Digit },
}

struct Inner<K> {
    kernel: K,
    state: State,
}

/// 7-segment display driver bound to a kernel `K`.
pub struct SegmentDevice<M: RawMutex, K: Kernel> {
    config: DriverConfig,
    inner: Mutex<M, RefCell<Inner<K>>>,
}

impl<M: RawMutex, K: Kernel> SegmentDevice<M, K> {
    /// Driver in the Unloaded state; nothing is acquired until [`Self::load`].
    pub fn new(kernel: K, config: DriverConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(RefCell::new(Inner {
                kernel,
                state: State::Unloaded,
            })),
        }
    }

    /// Load configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Acquire every resource and bring the display up.
    ///
    /// On failure nothing stays acquired and the driver remains Unloaded.
    pub fn load(&self) -> Result<(), InitError> {
        self.inner.lock(|cell| {
            let inner = &mut *cell.borrow_mut();
            if matches!(inner.state, State::Ready { .. }) {
                return Err(InitError::AlreadyLoaded);
            }

            let resources = Resources::acquire(&mut inner.kernel, &self.config)?;
            let current = match self.config.boot_display {
                BootDisplay::Blank => Digit::ZERO,
                BootDisplay::Digit(digit) => {
                    resources.lines().apply(&mut inner.kernel, digit.pattern());
                    digit
                }
            };
            tracing::info!(
                name = self.config.name,
                dev = %resources.dev(),
                first_gpio = %resources.lines().first(),
                digit = current.get(),
                "display driver loaded"
            );
            inner.state = State::Ready { resources, current };
            Ok(())
        })
    }

    /// Release every resource. Does nothing if the driver is not loaded.
    pub fn unload(&self) {
        self.inner.lock(|cell| {
            let inner = &mut *cell.borrow_mut();
            match core::mem::replace(&mut inner.state, State::Unloaded) {
                State::Ready { resources, .. } => {
                    resources.release(&mut inner.kernel);
                    tracing::info!(name = self.config.name, "display driver unloaded");
                }
                State::Unloaded => {
                    tracing::warn!(name = self.config.name, "unload without load");
                }
            }
        });
    }

    /// Whether the driver is Ready.
    pub fn is_loaded(&self) -> bool {
        self.inner
            .lock(|cell| matches!(cell.borrow().state, State::Ready { .. }))
    }

    /// Digit currently displayed, `None` while Unloaded.
    pub fn current_digit(&self) -> Option<Digit> {
        self.inner.lock(|cell| match cell.borrow().state {
            State::Ready { current, .. } => Some(current),
            State::Unloaded => None,
        })
    }

    /// Digit and pin readback taken under one lock, `None` while Unloaded.
    pub fn snapshot(&self) -> Option<(Digit, SegmentPattern)> {
        self.inner.lock(|cell| {
            let inner = &*cell.borrow();
            match &inner.state {
                State::Ready { resources, current } => {
                    Some((*current, resources.lines().read_back(&inner.kernel)))
                }
                State::Unloaded => None,
            }
        })
    }

    /// Run `f` against the kernel while holding the lock.
    pub fn with_kernel<R>(&self, f: impl FnOnce(&K) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow().kernel))
    }

    /// Mutable access to the kernel; exclusive ownership needs no lock.
    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.inner.get_mut().get_mut().kernel
    }

    /// Unload if needed and hand the kernel back.
    pub fn into_kernel(self) -> K {
        let Inner { mut kernel, state } = self.inner.into_inner().into_inner();
        if let State::Ready { resources, .. } = state {
            resources.release(&mut kernel);
            tracing::info!(name = self.config.name, "display driver unloaded");
        }
        kernel
    }

    fn display(&self, digit: Digit) -> Result<(), IoError> {
        self.inner.lock(|cell| {
            let inner = &mut *cell.borrow_mut();
            match &mut inner.state {
                State::Ready { resources, current } => {
                    resources.lines().apply(&mut inner.kernel, digit.pattern());
                    *current = digit;
                    Ok(())
                }
                State::Unloaded => Err(IoError::NotReady),
            }
        })
    }
}

fn parse_digit(payload: &[u8]) -> Result<Digit, IoError> {
    let value = parse_decimal(payload).map_err(|err| match err {
        ParseError::Invalid => IoError::InvalidFormat,
        ParseError::Overflow { negative: true } => IoError::OutOfRange(i64::MIN),
        ParseError::Overflow { negative: false } => IoError::OutOfRange(i64::MAX),
    })?;
    Digit::try_from(value).map_err(IoError::OutOfRange)
}

impl<M: RawMutex, K: Kernel> FileOperations for SegmentDevice<M, K> {
    type Error = IoError;

    fn open(&self, file: &OpenFile) -> Result<(), IoError> {
        tracing::info!(session = file.session(), "device opened");
        Ok(())
    }

    fn release(&self, file: &OpenFile) {
        tracing::info!(session = file.session(), "device closed");
    }

    fn read<W>(&self, file: &OpenFile, writer: &mut W, _offset: u64) -> Result<usize, IoError>
    where
        W: UserSliceWriter + ?Sized,
    {
        let digit = self.inner.lock(|cell| {
            let inner = &*cell.borrow();
            match &inner.state {
                State::Ready { resources, current } => {
                    let pins = resources.lines().read_back(&inner.kernel);
                    tracing::info!(session = file.session(), digit = current.get(), "read");
                    tracing::debug!(
                        first_gpio = %resources.lines().first(),
                        pins = %pins,
                        "pin readback"
                    );
                    Ok(*current)
                }
                State::Unloaded => Err(IoError::NotReady),
            }
        })?;

        if writer.is_empty() {
            return Err(IoError::CopyFault);
        }
        writer
            .write_slice(&[digit.to_ascii()])
            .map_err(|_| IoError::CopyFault)?;
        Ok(1)
    }

    fn write<R>(&self, file: &OpenFile, reader: &mut R, _offset: u64) -> Result<usize, IoError>
    where
        R: UserSliceReader + ?Sized,
    {
        if !self.is_loaded() {
            return Err(IoError::NotReady);
        }

        let len = reader.len();
        let mut buf = [0u8; WRITE_BUFFER_CAPACITY];
        let payload = buf
            .get_mut(..len.min(WRITE_BUFFER_CAPACITY))
            .ok_or(IoError::CopyFault)?;
        reader
            .read_slice(payload)
            .map_err(|_| IoError::CopyFault)?;

        match payload.first() {
            Some(first) => tracing::info!(
                session = file.session(),
                len,
                first = %char::from(*first),
                "write"
            ),
            None => tracing::info!(session = file.session(), len, "empty write"),
        }
        if len > WRITE_BUFFER_CAPACITY {
            return Err(IoError::InvalidFormat);
        }

        let digit = parse_digit(payload)?;
        self.display(digit)?;
        tracing::info!(session = file.session(), digit = digit.get(), "digit displayed");
        Ok(len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex as StdMutex};

    use platform::mocks::{Fault, MockKernel, MockUserReader, MockUserWriter};
    use platform::GpioNum;
    use tracing_subscriber::util::SubscriberInitExt;

    use super::*;
    use crate::config::SEGMENT_COUNT;

    /// Log sink shared with a thread-local subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<StdMutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn loaded() -> SevenSegDevice<MockKernel> {
        let device = SevenSegDevice::new(MockKernel::new(), DriverConfig::default());
        device.load().unwrap();
        device
    }

    fn write(device: &SevenSegDevice<MockKernel>, payload: &[u8]) -> Result<usize, IoError> {
        device.write(&OpenFile::new(1), &mut MockUserReader::new(payload), 0)
    }

    fn read(device: &SevenSegDevice<MockKernel>) -> Vec<u8> {
        let mut out = MockUserWriter::with_capacity(4);
        assert_eq!(device.read(&OpenFile::new(1), &mut out, 0), Ok(1));
        out.written().to_vec()
    }

    #[test]
    fn parse_digit_maps_errors() {
        assert_eq!(parse_digit(b"7"), Ok(Digit::new(7).unwrap()));
        assert_eq!(parse_digit(b"x"), Err(IoError::InvalidFormat));
        assert_eq!(parse_digit(b"10"), Err(IoError::OutOfRange(10)));
        assert_eq!(
            parse_digit(b"-99999999999999999999"),
            Err(IoError::OutOfRange(i64::MIN))
        );
        assert_eq!(
            parse_digit(b"99999999999999999999\n"),
            Err(IoError::OutOfRange(i64::MAX))
        );
    }

    #[test]
    fn load_twice_is_rejected() {
        let device = loaded();
        assert_eq!(device.load(), Err(InitError::AlreadyLoaded));
        assert!(device.is_loaded());
    }

    #[test]
    fn fresh_load_reads_zero() {
        let device = loaded();
        assert_eq!(read(&device), b"0");
        assert_eq!(device.snapshot().unwrap().1, SegmentPattern::BLANK);
    }

    #[test]
    fn write_then_read() {
        let device = loaded();
        assert_eq!(write(&device, b"3"), Ok(1));
        assert_eq!(read(&device), b"3");
        assert_eq!(device.current_digit(), Digit::new(3));
    }

    #[test]
    fn boot_digit_is_shown() {
        let config = DriverConfig::new().with_boot_display(BootDisplay::Digit(Digit::MAX));
        let device = SevenSegDevice::new(MockKernel::new(), config);
        device.load().unwrap();

        assert_eq!(read(&device), b"9");
        let (digit, pattern) = device.snapshot().unwrap();
        assert_eq!(digit, Digit::MAX);
        assert_eq!(pattern, Digit::MAX.pattern());
    }

    #[test]
    fn io_before_load_is_not_ready() {
        let device = SevenSegDevice::new(MockKernel::new(), DriverConfig::default());
        let file = OpenFile::new(1);
        assert_eq!(device.open(&file), Ok(()));
        assert_eq!(write(&device, b"1"), Err(IoError::NotReady));
        let mut out = MockUserWriter::with_capacity(1);
        assert_eq!(device.read(&file, &mut out, 0), Err(IoError::NotReady));
        assert!(out.written().is_empty());
    }

    #[test]
    fn oversized_payload_is_rejected_after_copy() {
        let device = loaded();
        assert_eq!(write(&device, b"00000000005"), Err(IoError::InvalidFormat));
        assert_eq!(read(&device), b"0");
    }

    #[test]
    fn into_kernel_unloads() {
        let device = loaded();
        let kernel = device.into_kernel();
        assert!(kernel.held().is_empty());
        assert!(kernel.bad_releases().is_empty());
    }

    #[test]
    fn kernel_mut_reaches_mock() {
        let mut device = loaded();
        device.kernel_mut().clear_events();
        assert!(device.with_kernel(|kernel| kernel.events().is_empty()));
        assert_eq!(
            device.with_kernel(|kernel| kernel.label(GpioNum::new(7))),
            Some("7segs")
        );
    }

    #[test]
    fn every_read_samples_the_lines() {
        let device = loaded();
        write(&device, b"3").unwrap();
        let before = device.with_kernel(MockKernel::readbacks);
        for _ in 0..3 {
            read(&device);
        }
        assert_eq!(
            device.with_kernel(MockKernel::readbacks),
            before + 3 * SEGMENT_COUNT
        );
    }

    #[test]
    fn teardown_after_failed_load_does_not_warn() {
        let logs = LogBuffer::default();
        let sink = logs.clone();
        let _guard = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish()
            .set_default();

        let device = SevenSegDevice::new(
            MockKernel::new().failing(Fault::CdevAdd),
            DriverConfig::default(),
        );
        assert!(device.load().is_err());
        let kernel = device.into_kernel();
        assert!(kernel.held().is_empty());
        assert!(kernel.bad_releases().is_empty());

        let output = logs.contents();
        assert!(output.contains("load failed, rolling back"), "{output}");
        assert!(!output.contains("WARN"), "{output}");
    }
}
