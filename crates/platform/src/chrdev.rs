//! Character-device number allocation and registration.
//!
//! Two separate kernel steps make a device number usable:
//! reserving a region of minor numbers under a name, then adding the
//! character-device entry that routes file operations to the driver.
//! Both are undone in the opposite order.

use crate::error::Result;

/// Number of bits used by the minor part of an encoded device number.
pub const MINOR_BITS: u32 = 20;

/// Mask selecting the minor part of an encoded device number.
pub const MINOR_MASK: u32 = 0x000F_FFFF;

/// Device number (`dev_t`): a major/minor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DevNumber {
    major: u32,
    minor: u32,
}

impl DevNumber {
    /// Build a device number, truncating each part to its field width.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major: major & u32::MAX.wrapping_shr(MINOR_BITS),
            minor: minor & MINOR_MASK,
        }
    }

    /// Major number.
    #[must_use]
    pub const fn major(self) -> u32 {
        self.major
    }

    /// Minor number.
    #[must_use]
    pub const fn minor(self) -> u32 {
        self.minor
    }

    /// Kernel `MKDEV` encoding: `major << 20 | minor`.
    #[must_use]
    pub const fn encode(self) -> u32 {
        self.major.wrapping_shl(MINOR_BITS) | self.minor
    }

    /// Inverse of [`DevNumber::encode`].
    #[must_use]
    pub const fn decode(raw: u32) -> Self {
        Self {
            major: raw.wrapping_shr(MINOR_BITS),
            minor: raw & MINOR_MASK,
        }
    }
}

impl core::fmt::Display for DevNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Device-number allocator and character-device table.
pub trait ChrdevRegistry {
    /// Reserve `count` consecutive minors starting at `first_minor` under a
    /// dynamically assigned major (`alloc_chrdev_region`).
    fn alloc_region(&mut self, first_minor: u32, count: u32, name: &'static str)
        -> Result<DevNumber>;

    /// Release a region reserved with [`ChrdevRegistry::alloc_region`].
    fn unregister_region(&mut self, dev: DevNumber, count: u32);

    /// Make the character device live at `dev` (`cdev_add`).
    ///
    /// From this point the VFS may dispatch file operations to the driver.
    fn cdev_add(&mut self, dev: DevNumber, count: u32) -> Result;

    /// Remove the character device added at `dev` (`cdev_del`).
    fn cdev_del(&mut self, dev: DevNumber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_matches_mkdev() {
        let dev = DevNumber::new(240, 0);
        assert_eq!(dev.encode(), 240 << 20);
        assert_eq!(DevNumber::new(1, 3).encode(), (1 << 20) | 3);
    }

    #[test]
    fn decode_inverts_encode() {
        let dev = DevNumber::new(511, 7);
        assert_eq!(DevNumber::decode(dev.encode()), dev);
    }

    #[test]
    fn minor_is_truncated_to_field_width() {
        let dev = DevNumber::new(1, MINOR_MASK + 5);
        assert_eq!(dev.minor(), 4);
    }

    #[test]
    fn display_is_major_colon_minor() {
        assert_eq!(DevNumber::new(240, 0).to_string(), "240:0");
    }
}
