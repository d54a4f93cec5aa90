//! pflash-dummy - Flash device doubles for testing
//!
//! This crate provides devices that stand in for real hardware behind the
//! pflash driver:
//!
//! - [`EmulatedFlash`] behaves like a NOR part: it has a command register,
//!   programs bits from 1 to 0, goes busy for a while and can be told to
//!   fail or hang
//! - [`ScriptedFlash`] replays a fixed sequence of status bytes
//! - [`StepClock`] makes timeouts deterministic
//!
//! Both devices record every bus access as an [`Op`].

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod clock;
#[cfg(feature = "alloc")]
mod emulated;
#[cfg(feature = "alloc")]
mod scripted;

pub use clock::StepClock;
#[cfg(feature = "alloc")]
pub use emulated::{EmulatedConfig, EmulatedFlash};
#[cfg(feature = "alloc")]
pub use scripted::ScriptedFlash;

use pflash_core::device::Address;

/// A single bus access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Byte read at an address
    Read(Address),
    /// Byte write of a value at an address
    Write(Address, u8),
}
