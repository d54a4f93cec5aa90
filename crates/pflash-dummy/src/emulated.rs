//! In-memory NOR flash emulator
//!
//! Emulates a device with the command/status register at address 0x00 and
//! a byte array behind it. Programming can only clear bits (1 -> 0); erased
//! cells read as 0xFF.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use pflash_core::commands::{
    INTERNAL_ERROR_MASK, PROGRAM_COMMAND, PROTECTED_BLOCK_ERROR_MASK, READY_MASK,
    READY_NO_ERROR, RESET_COMMAND, STATUS_ADDRESS,
};
use pflash_core::device::{Address, FlashDevice};

use crate::Op;

/// Configuration for the emulated flash
#[derive(Debug, Clone)]
pub struct EmulatedConfig {
    /// Array size in bytes, including the cell shadowed by the status register
    pub size: usize,
    /// Number of status polls that report busy before a program completes
    pub busy_polls: u32,
}

impl Default for EmulatedConfig {
    fn default() -> Self {
        Self {
            size: 64 * 1024,
            busy_polls: 3,
        }
    }
}

/// Command state of the emulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Idle, status reports ready
    ReadArray,
    /// Program command received, waiting for the data write
    Armed,
    /// Program in progress; `None` never completes
    Busy(Option<u32>),
    /// Error latched until the next reset
    Failed(u8),
}

/// Emulated parallel NOR flash
pub struct EmulatedFlash {
    config: EmulatedConfig,
    data: Vec<u8>,
    state: State,
    protected: Vec<Range<Address>>,
    fault: Option<u8>,
    stall: bool,
    ops: Vec<Op>,
}

impl EmulatedFlash {
    /// Create a new, fully erased flash with the given configuration
    pub fn new(config: EmulatedConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            state: State::ReadArray,
            protected: Vec::new(),
            fault: None,
            stall: false,
            ops: Vec::new(),
        }
    }

    /// Create a new flash with the default configuration (64 KiB)
    pub fn new_default() -> Self {
        Self::new(EmulatedConfig::default())
    }

    /// Create a flash with pre-filled data
    pub fn with_data(config: EmulatedConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get a reference to the array contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &EmulatedConfig {
        &self.config
    }

    /// Write-protect a range of addresses
    ///
    /// Programs into the range fail with the protected block status bit.
    pub fn protect(&mut self, range: Range<Address>) {
        self.protected.push(range);
    }

    /// Make the next program cycle fail with `status`
    ///
    /// The status byte is reported verbatim until the device is reset, so
    /// it can carry any combination of bits, known or not. The target cell
    /// is left untouched.
    pub fn inject_fault(&mut self, status: u8) {
        self.fault = Some(status);
    }

    /// Make the next program cycle hang with the device busy until reset
    pub fn stall_next_program(&mut self) {
        self.stall = true;
    }

    /// Every bus access seen so far, in order
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Forget the recorded bus accesses
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Count how many times `op` was seen
    pub fn count(&self, op: Op) -> usize {
        self.ops.iter().filter(|&&o| o == op).count()
    }

    fn is_protected(&self, address: Address) -> bool {
        self.protected.iter().any(|r| r.contains(&address))
    }

    fn read_status(&mut self) -> u8 {
        match self.state {
            State::ReadArray => READY_MASK,
            State::Armed | State::Busy(None) => READY_NO_ERROR,
            State::Busy(Some(0)) => {
                self.state = State::ReadArray;
                READY_MASK
            }
            State::Busy(Some(n)) => {
                self.state = State::Busy(Some(n - 1));
                READY_NO_ERROR
            }
            State::Failed(status) => status,
        }
    }

    fn handle_command(&mut self, command: u8) {
        match (command, self.state) {
            (RESET_COMMAND, _) => {
                log::trace!("emulated flash: reset");
                self.state = State::ReadArray;
            }
            (PROGRAM_COMMAND, State::ReadArray) => self.state = State::Armed,
            // Anything else is ignored while an operation is pending
            _ => {}
        }
    }

    /// Array index for `address`, if it falls inside the array
    fn index(&self, address: Address) -> Option<usize> {
        usize::try_from(address)
            .ok()
            .filter(|&index| index < self.data.len())
    }

    fn handle_program(&mut self, address: Address, byte: u8) {
        let index = self.index(address);

        self.state = if let Some(status) = self.fault.take() {
            State::Failed(status)
        } else if self.is_protected(address) {
            State::Failed(PROTECTED_BLOCK_ERROR_MASK)
        } else if let Some(index) = index {
            // Flash programming: can only change 1 -> 0
            self.data[index] &= byte;
            if self.stall {
                self.stall = false;
                State::Busy(None)
            } else {
                State::Busy(Some(self.config.busy_polls))
            }
        } else {
            State::Failed(INTERNAL_ERROR_MASK)
        };
    }
}

impl FlashDevice for EmulatedFlash {
    fn read(&mut self, address: Address) -> u8 {
        self.ops.push(Op::Read(address));
        if address == STATUS_ADDRESS {
            return self.read_status();
        }
        // Reads past the end float high
        match self.index(address) {
            Some(index) => self.data[index],
            None => 0xFF,
        }
    }

    fn write(&mut self, address: Address, data: u8) {
        self.ops.push(Op::Write(address, data));
        if self.state == State::Armed {
            self.handle_program(address, data);
        } else if address == STATUS_ADDRESS {
            self.handle_command(data);
        }
    }
}
