//! Status register decoding
//!
//! The status byte is re-read on every poll. While the ready bit is clear,
//! any other set bit is an error report; the three known error bits are
//! checked in a fixed priority order.

use bitflags::bitflags;

use crate::commands::{
    INTERNAL_ERROR_MASK, PROTECTED_BLOCK_ERROR_MASK, READY_MASK, READY_NO_ERROR, VPP_MASK,
};
use crate::error::Error;

bitflags! {
    /// Status register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Device finished the current operation
        const READY           = READY_MASK;
        /// **P**rogramming **V**oltage error
        const VPP             = VPP_MASK;
        /// Internal device error
        const INTERNAL_ERROR  = INTERNAL_ERROR_MASK;
        /// Protected block error
        const PROTECTED_BLOCK = PROTECTED_BLOCK_ERROR_MASK;

        // Bits we don't assign a meaning to are still reported by the device
        const _ = !0;
    }
}

impl Status {
    /// The first known error bit, in priority order
    ///
    /// Voltage errors win over internal errors, which win over protected
    /// block errors.
    pub fn error(&self) -> Option<Error> {
        if self.contains(Status::VPP) {
            Some(Error::Voltage)
        } else if self.contains(Status::INTERNAL_ERROR) {
            Some(Error::Internal)
        } else if self.contains(Status::PROTECTED_BLOCK) {
            Some(Error::ProtectedBlock)
        } else {
            None
        }
    }

    /// Whether the ready bit is set
    pub fn is_ready(&self) -> bool {
        self.contains(Status::READY)
    }
}

/// Outcome of a single status poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// Ready bit set; the program cycle is over
    Ready,
    /// Nothing set yet; keep polling
    Busy,
    /// A known error bit is set; the cycle must be aborted
    Fault(Error),
    /// Nonzero status with no known error bit; the cycle keeps polling
    Unrecognized(u8),
}

impl Poll {
    /// Whether the device has to be reset after this poll
    pub fn needs_reset(&self) -> bool {
        matches!(self, Poll::Fault(_) | Poll::Unrecognized(_))
    }
}

/// Classify a raw status byte read during the poll loop
///
/// The ready bit takes precedence over everything else: error bits are only
/// looked at while the device is still busy.
pub fn classify(raw: u8) -> Poll {
    let status = Status::from_bits_retain(raw);
    if status.is_ready() {
        Poll::Ready
    } else if raw == READY_NO_ERROR {
        Poll::Busy
    } else {
        match status.error() {
            Some(err) => Poll::Fault(err),
            None => Poll::Unrecognized(raw),
        }
    }
}
