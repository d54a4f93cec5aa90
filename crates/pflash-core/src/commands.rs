//! Command register layout and bit definitions
//!
//! The device multiplexes its command and status registers onto a single
//! address. Writing to it issues a command; reading it returns the status
//! byte.

use crate::device::Address;

/// Address of the combined command/status register
pub const STATUS_ADDRESS: Address = 0x00;

// ============================================================================
// Commands
// ============================================================================

/// Arm the device for a single byte program cycle
pub const PROGRAM_COMMAND: u8 = 0x40;
/// Abort the current operation and return the device to read mode
pub const RESET_COMMAND: u8 = 0xFF;

// ============================================================================
// Status register bits
// ============================================================================

/// Device finished the current operation (successfully or not)
pub const READY_MASK: u8 = 0x02;
/// Programming voltage (Vpp) out of range
pub const VPP_MASK: u8 = 0x20;
/// Internal device error
pub const INTERNAL_ERROR_MASK: u8 = 0x10;
/// Program attempted on a write-protected block
pub const PROTECTED_BLOCK_ERROR_MASK: u8 = 0x08;
/// No status bits set: busy, no error reported yet
pub const READY_NO_ERROR: u8 = 0x00;
