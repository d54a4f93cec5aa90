//! Scripted flash double
//!
//! [`ScriptedFlash`] answers status reads from a queue of canned bytes and
//! records every bus access, for tests that care about the exact sequence of
//! commands the driver issues.

use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec::Vec;

use pflash_core::commands::{READY_MASK, STATUS_ADDRESS};
use pflash_core::device::{Address, FlashDevice};

use crate::Op;

/// Flash double driven by a status script
pub struct ScriptedFlash {
    statuses: VecDeque<u8>,
    idle_status: u8,
    memory: BTreeMap<Address, u8>,
    stuck: BTreeSet<Address>,
    ops: Vec<Op>,
}

impl Default for ScriptedFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedFlash {
    /// Create a double whose status register always reports ready
    pub fn new() -> Self {
        Self {
            statuses: VecDeque::new(),
            idle_status: READY_MASK,
            memory: BTreeMap::new(),
            stuck: BTreeSet::new(),
            ops: Vec::new(),
        }
    }

    /// Create a double that answers the first status reads with `statuses`
    pub fn with_statuses(statuses: &[u8]) -> Self {
        let mut flash = Self::new();
        flash.push_statuses(statuses);
        flash
    }

    /// Queue more status bytes
    pub fn push_statuses(&mut self, statuses: &[u8]) {
        self.statuses.extend(statuses.iter().copied());
    }

    /// Status reported once the script has run out
    pub fn set_idle_status(&mut self, status: u8) {
        self.idle_status = status;
    }

    /// Set the byte at `address` without recording a bus access
    pub fn set_byte(&mut self, address: Address, value: u8) {
        self.memory.insert(address, value);
    }

    /// Pin the byte at `address` to `value`, ignoring later writes to it
    pub fn stick(&mut self, address: Address, value: u8) {
        self.memory.insert(address, value);
        self.stuck.insert(address);
    }

    /// Every bus access seen so far, in order
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Count how many times `op` was seen
    pub fn count(&self, op: Op) -> usize {
        self.ops.iter().filter(|&&o| o == op).count()
    }

    /// Number of status register reads
    pub fn status_reads(&self) -> usize {
        self.count(Op::Read(STATUS_ADDRESS))
    }
}

impl FlashDevice for ScriptedFlash {
    fn read(&mut self, address: Address) -> u8 {
        self.ops.push(Op::Read(address));
        if address == STATUS_ADDRESS {
            return self.statuses.pop_front().unwrap_or(self.idle_status);
        }
        self.memory.get(&address).copied().unwrap_or(0xFF)
    }

    fn write(&mut self, address: Address, data: u8) {
        self.ops.push(Op::Write(address, data));
        if address != STATUS_ADDRESS && !self.stuck.contains(&address) {
            self.memory.insert(address, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_script_then_idle() {
        let mut flash = ScriptedFlash::with_statuses(&[0x00, 0x20]);
        assert_eq!(flash.read(STATUS_ADDRESS), 0x00);
        assert_eq!(flash.read(STATUS_ADDRESS), 0x20);
        assert_eq!(flash.read(STATUS_ADDRESS), READY_MASK);

        flash.set_idle_status(0x00);
        assert_eq!(flash.read(STATUS_ADDRESS), 0x00);
        assert_eq!(flash.status_reads(), 4);
    }

    #[test]
    fn test_memory_and_stuck_bytes() {
        let mut flash = ScriptedFlash::new();
        assert_eq!(flash.read(0x10), 0xFF);
        flash.write(0x10, 0x42);
        assert_eq!(flash.read(0x10), 0x42);

        flash.stick(0x20, 0x00);
        flash.write(0x20, 0x42);
        assert_eq!(flash.read(0x20), 0x00);

        flash.set_byte(0x30, 0x99);
        assert_eq!(flash.read(0x30), 0x99);
        assert_eq!(flash.count(Op::Write(0x20, 0x42)), 1);
    }

    #[test]
    fn test_status_writes_do_not_touch_memory() {
        let mut flash = ScriptedFlash::new();
        flash.set_byte(STATUS_ADDRESS, 0x55);
        flash.write(STATUS_ADDRESS, 0x40);
        assert_eq!(flash.memory.get(&STATUS_ADDRESS), Some(&0x55));
    }
}
