//! Concurrent sessions: writers and readers on separate threads never see a
//! digit that disagrees with the pins driving the display.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

use std::sync::Arc;
use std::thread;

use platform::mocks::{MockKernel, MockUserReader, MockUserWriter};
use platform::{FileOperations, OpenFile};
use sevenseg::{Digit, DriverConfig, SevenSegDevice};

const WRITERS: u64 = 4;
const READERS: u64 = 4;
const ROUNDS: usize = 200;

#[test]
fn pins_always_match_current_digit() {
    let device = Arc::new(SevenSegDevice::new(MockKernel::new(), DriverConfig::default()));
    device.load().unwrap();

    let mut handles = Vec::new();
    for session in 0..WRITERS {
        let device = Arc::clone(&device);
        handles.push(thread::spawn(move || {
            let file = OpenFile::new(session);
            device.open(&file).unwrap();
            for round in 0..ROUNDS {
                let digit = Digit::new(((session as usize + round) % 10) as u8).unwrap();
                let payload = [digit.to_ascii()];
                let written = device.write(&file, &mut MockUserReader::new(&payload), 0);
                assert_eq!(written, Ok(1));
            }
            device.release(&file);
        }));
    }
    for session in WRITERS..WRITERS + READERS {
        let device = Arc::clone(&device);
        handles.push(thread::spawn(move || {
            let file = OpenFile::new(session);
            for _ in 0..ROUNDS {
                let (digit, pattern) = device.snapshot().unwrap();
                assert_eq!(pattern, digit.pattern(), "torn display for {digit}");

                let mut out = MockUserWriter::with_capacity(1);
                assert_eq!(device.read(&file, &mut out, 0), Ok(1));
                assert!(out.written()[0].is_ascii_digit());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let (digit, pattern) = device.snapshot().unwrap();
    assert_eq!(pattern, digit.pattern());
}

#[test]
fn device_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SevenSegDevice<MockKernel>>();
}
