//! Error types for pflash-core
//!
//! This module provides a no_std compatible error type for the program
//! cycle. Each variant is fatal to the write that produced it.

use core::fmt;

use crate::device::Address;

/// Program cycle failure - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Errors reported by the device (a reset command was issued)
    /// Programming voltage error (status bit 0x20)
    Voltage,
    /// Internal device error (status bit 0x10)
    Internal,
    /// Program attempted on a protected block (status bit 0x08)
    ProtectedBlock,

    // Errors detected by the driver
    /// Device did not report ready within the configured timeout
    Timeout,
    /// Byte read back after programming does not match what was written
    Verify {
        /// Address that was programmed
        address: Address,
        /// Byte that was written
        expected: u8,
        /// Byte that was read back
        found: u8,
    },
}

impl Error {
    /// Whether the device itself flagged this error in its status register
    ///
    /// Device-reported errors are always followed by a reset command.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Voltage | Self::Internal | Self::ProtectedBlock)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Voltage => write!(f, "programming voltage error"),
            Self::Internal => write!(f, "internal device error"),
            Self::ProtectedBlock => write!(f, "write to protected block"),
            Self::Timeout => write!(f, "timed out waiting for device ready"),
            Self::Verify {
                address,
                expected,
                found,
            } => write!(
                f,
                "verify failed at 0x{:08X}: expected 0x{:02X}, found 0x{:02X}",
                address, expected, found
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_device_errors() {
        assert!(Error::Voltage.is_device_error());
        assert!(Error::Internal.is_device_error());
        assert!(Error::ProtectedBlock.is_device_error());
        assert!(!Error::Timeout.is_device_error());
        assert!(!Error::Verify {
            address: 0,
            expected: 0,
            found: 1
        }
        .is_device_error());
    }

    #[test]
    fn test_display() {
        let err = Error::Verify {
            address: 0x1234,
            expected: 0xA5,
            found: 0xFF,
        };
        assert_eq!(
            err.to_string(),
            "verify failed at 0x00001234: expected 0xA5, found 0xFF"
        );
        assert_eq!(Error::Timeout.to_string(), "timed out waiting for device ready");
    }
}
