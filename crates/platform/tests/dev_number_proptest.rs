//! Property-based tests for device-number encoding.
//! Verifies the MKDEV layout holds for every major/minor in range.

// Property test file -- shifts in assertions are intentional.
#![allow(clippy::arithmetic_side_effects)]

use platform::chrdev::{DevNumber, MINOR_BITS, MINOR_MASK};

proptest::proptest! {
    /// Parts survive encoding for every in-range major/minor.
    #[test]
    fn encode_preserves_parts(major in 0u32..4096, minor in 0u32..=MINOR_MASK) {
        let dev = DevNumber::new(major, minor);
        let decoded = DevNumber::decode(dev.encode());
        assert_eq!(decoded.major(), major);
        assert_eq!(decoded.minor(), minor);
    }

    /// The minor never leaks into the major field.
    #[test]
    fn minor_stays_in_low_bits(major in 0u32..4096, minor in 0u32..=u32::MAX) {
        let raw = DevNumber::new(major, minor).encode();
        assert_eq!(raw >> MINOR_BITS, major);
    }

    /// Encoding is monotone in the major number for a fixed minor.
    #[test]
    fn encode_orders_by_major(a in 0u32..4096, b in 0u32..4096, minor in 0u32..=MINOR_MASK) {
        let ea = DevNumber::new(a, minor).encode();
        let eb = DevNumber::new(b, minor).encode();
        assert_eq!(a.cmp(&b), ea.cmp(&eb));
    }
}
