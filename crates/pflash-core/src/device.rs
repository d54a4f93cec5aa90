//! Flash device interface
//!
//! A [`FlashDevice`] is whatever sits behind the bus: a memory-mapped
//! hardware binding, a bus bridge, or an in-memory emulator for tests. The
//! driver only ever borrows it.

/// Byte offset into the device address space
///
/// No upper bound is enforced here; what happens past the end of the array
/// is up to the device implementation.
pub type Address = u64;

/// Byte-wide access to a flash device
///
/// Both operations are infallible from the driver's point of view. Bus
/// errors, if a binding can detect them, have to be surfaced by the binding
/// itself (for example by reporting a status byte with an error bit set).
pub trait FlashDevice {
    /// Read the byte at `address`
    fn read(&mut self, address: Address) -> u8;

    /// Write `data` to `address`
    fn write(&mut self, address: Address, data: u8);
}

impl<D: FlashDevice + ?Sized> FlashDevice for &mut D {
    fn read(&mut self, address: Address) -> u8 {
        (**self).read(address)
    }

    fn write(&mut self, address: Address, data: u8) {
        (**self).write(address, data)
    }
}

// Blanket impl for boxed devices so bindings can be picked at runtime
#[cfg(feature = "alloc")]
impl FlashDevice for alloc::boxed::Box<dyn FlashDevice + Send> {
    fn read(&mut self, address: Address) -> u8 {
        (**self).read(address)
    }

    fn write(&mut self, address: Address, data: u8) {
        (**self).write(address, data)
    }
}
