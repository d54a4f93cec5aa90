//! Byte programming driver
//!
//! [`Driver`] runs one program cycle per [`Driver::write`] call:
//!
//! 1. Write [`PROGRAM_COMMAND`] to the command register
//! 2. Write the data byte to its target address
//! 3. Poll the status register until the ready bit is set, a known error bit
//!    shows up, or the timeout passes
//! 4. Read the byte back and compare
//!
//! The poll loop busy-waits. Every error aborts the cycle; nothing is retried.

use crate::clock::{Clock, Stopwatch};
use crate::commands::{PROGRAM_COMMAND, RESET_COMMAND, STATUS_ADDRESS};
use crate::config::DriverConfig;
use crate::device::{Address, FlashDevice};
use crate::error::{Error, Result};
use crate::status::{self, Poll, Status};

#[cfg(feature = "std")]
use crate::clock::StdClock;

/// Programming driver for a borrowed [`FlashDevice`]
///
/// The driver holds the device for its whole lifetime but never owns it.
/// The `&mut` borrow rules out concurrent writes through the same device.
pub struct Driver<'a, D: ?Sized, C> {
    device: &'a mut D,
    clock: C,
    config: DriverConfig,
}

#[cfg(feature = "std")]
impl<'a, D: FlashDevice + ?Sized> Driver<'a, D, StdClock> {
    /// Create a driver with the default configuration and the wall clock
    pub fn new(device: &'a mut D) -> Self {
        Self::with_config(device, DriverConfig::default())
    }

    /// Create a driver with the given configuration and the wall clock
    pub fn with_config(device: &'a mut D, config: DriverConfig) -> Self {
        Self::with_clock(device, StdClock::new(), config)
    }
}

impl<'a, D, C> Driver<'a, D, C>
where
    D: FlashDevice + ?Sized,
    C: Clock,
{
    /// Create a driver that measures the poll loop timeout with `clock`
    pub fn with_clock(device: &'a mut D, clock: C, config: DriverConfig) -> Self {
        Self {
            device,
            clock,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Get a reference to the underlying device
    pub fn device(&self) -> &D {
        &*self.device
    }

    /// Read the byte at `address`
    ///
    /// Straight pass-through to the device, no side effects of its own.
    pub fn read(&mut self, address: Address) -> u8 {
        self.device.read(address)
    }

    /// Read and decode the status register once
    pub fn read_status(&mut self) -> Status {
        Status::from_bits_retain(self.device.read(STATUS_ADDRESS))
    }

    /// Send the reset command, aborting whatever the device is doing
    pub fn reset(&mut self) {
        self.device.write(STATUS_ADDRESS, RESET_COMMAND);
    }

    /// Program `data` at `address` and verify it
    ///
    /// # Errors
    ///
    /// * [`Error::Voltage`], [`Error::Internal`], [`Error::ProtectedBlock`] -
    ///   the device flagged an error; a reset command has been sent
    /// * [`Error::Timeout`] - the device did not become ready in time
    /// * [`Error::Verify`] - the device became ready but the byte read back
    ///   differs from `data`
    pub fn write(&mut self, address: Address, data: u8) -> Result<()> {
        let stopwatch = Stopwatch::start(&mut self.clock);
        log::debug!("Programming 0x{:02X} at 0x{:08X}", data, address);

        self.device.write(STATUS_ADDRESS, PROGRAM_COMMAND);
        self.device.write(address, data);

        self.wait_ready(&stopwatch)?;
        self.verify(address, data)
    }

    /// Poll the status register until the ready bit is set
    fn wait_ready(&mut self, stopwatch: &Stopwatch) -> Result<()> {
        let mut polls: u32 = 0;
        let mut warned = false;

        loop {
            let raw = self.device.read(STATUS_ADDRESS);
            polls = polls.saturating_add(1);
            log::trace!("Status poll {}: 0x{:02X}", polls, raw);

            let poll = status::classify(raw);
            // Any nonzero status while busy aborts the operation on the device,
            // even when none of the known error bits is set
            if poll.needs_reset() {
                self.reset();
            }

            match poll {
                Poll::Ready => {
                    log::debug!("Device ready after {} poll(s)", polls);
                    return Ok(());
                }
                Poll::Busy => {}
                Poll::Fault(err) => {
                    log::warn!("Status 0x{:02X}: {}, device reset", raw, err);
                    return Err(err);
                }
                Poll::Unrecognized(raw) => {
                    if !warned {
                        log::warn!("Unrecognized status 0x{:02X}, still polling", raw);
                        warned = true;
                    }
                }
            }

            if stopwatch.elapsed(&mut self.clock) > self.config.timeout {
                log::warn!(
                    "No ready status after {} poll(s) ({:?})",
                    polls,
                    self.config.timeout
                );
                return Err(Error::Timeout);
            }
        }
    }

    fn verify(&mut self, address: Address, expected: u8) -> Result<()> {
        let found = self.device.read(address);
        if found != expected {
            return Err(Error::Verify {
                address,
                expected,
                found,
            });
        }
        Ok(())
    }
}
