//! pflash-core - Byte-programming driver for parallel NOR flash
//!
//! This crate drives a flash device that exposes nothing but single byte
//! reads and writes. Programming follows the classic command-register
//! sequence: arm the device with a program command, write the byte, poll the
//! status register until the device reports ready or an error, then read the
//! byte back to verify it.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`), the
//!   wall-clock [`clock::StdClock`] and TOML configuration files
//! - `alloc` - Enable the boxed [`device::FlashDevice`] implementation
//!
//! # Example
//!
//! ```ignore
//! use pflash_core::{driver::Driver, device::FlashDevice};
//!
//! fn program<D: FlashDevice>(device: &mut D) {
//!     let mut driver = Driver::new(device);
//!     match driver.write(0x1000, 0xA5) {
//!         Ok(()) => println!("programmed"),
//!         Err(e) => println!("program failed: {}", e),
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod clock;
pub mod commands;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod status;

pub use error::{Error, Result};
