#![no_std]
#![warn(missing_docs)]

//! `rscanfd-core` provides a set of essential abstractions that serve as a
//! thin integration layer between the platform independent [`rscanfd`] crate,
//! the platform it runs on and the operating system that drives it.
//!
//! - [`RegisterAccess`] is how the driver reaches the hardware. Target code
//!   uses [`Mmio`]; host tests substitute a simulated register file.
//! - [`Pdu`] and [`CanDriver`] are what the enclosing OS CAN subsystem
//!   consumes.
//!
//! Integrators of this crate are responsible for soundness of [`Mmio`]
//! construction and conforming to its safety prerequisites.
//!
//! [`rscanfd`]: <https://docs.rs/crate/rscanfd/>

pub use fugit;
pub use nb;

use vcell::VolatileCell;

/// Register-level access to the memory mapped peripherals
///
/// All addresses are absolute. The driver never assumes that a write is
/// observable by a following read of a *different* register; status bits are
/// polled until they reflect the requested state.
///
/// Implementors must perform every access with exactly the requested width.
/// The message buffer registers of the CAN peripheral fault on wider bursts,
/// which is why byte accessors are part of the trait.
///
/// # Examples
/// ```no_run
/// use rscanfd_core::{Mmio, RegisterAccess};
///
/// // Safety: the caller owns the peripherals behind these addresses.
/// let mut bus = unsafe { Mmio::new() };
/// let status = bus.read32(0xFFD0_008C);
/// bus.write8(0xFFD0_0250, 0x01);
/// # let _ = status;
/// ```
pub trait RegisterAccess {
    /// Read a 32-bit register
    fn read32(&self, address: usize) -> u32;
    /// Write a 32-bit register
    fn write32(&mut self, address: usize, value: u32);
    /// Read an 8-bit register
    fn read8(&self, address: usize) -> u8;
    /// Write an 8-bit register
    fn write8(&mut self, address: usize, value: u8);

    /// Read-modify-write of a 32-bit register
    fn modify32(&mut self, address: usize, f: impl FnOnce(u32) -> u32) {
        let value = self.read32(address);
        self.write32(address, f(value));
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    fn read32(&self, address: usize) -> u32 {
        (**self).read32(address)
    }

    fn write32(&mut self, address: usize, value: u32) {
        (**self).write32(address, value)
    }

    fn read8(&self, address: usize) -> u8 {
        (**self).read8(address)
    }

    fn write8(&mut self, address: usize, value: u8) {
        (**self).write8(address, value)
    }
}

/// Volatile access to physical memory
pub struct Mmio(());

impl Mmio {
    /// # Safety
    /// While `Mmio` exists
    /// - every address passed to it must point to a valid, suitably aligned
    ///   HW register of the target
    /// - the registers used by the driver must not be accessed from anywhere
    ///   else
    /// - only a single driver instance may use the same peripheral
    pub const unsafe fn new() -> Self {
        Self(())
    }

    fn cell<T>(address: usize) -> &'static VolatileCell<T> {
        // Safety: Validity of the address is a construction prerequisite.
        unsafe { &*(address as *const VolatileCell<T>) }
    }
}

impl RegisterAccess for Mmio {
    fn read32(&self, address: usize) -> u32 {
        Self::cell::<u32>(address).get()
    }

    fn write32(&mut self, address: usize, value: u32) {
        Self::cell::<u32>(address).set(value)
    }

    fn read8(&self, address: usize) -> u8 {
        Self::cell::<u8>(address).get()
    }

    fn write8(&mut self, address: usize, value: u8) {
        Self::cell::<u8>(address).set(value)
    }
}

/// Protocol data unit exchanged with the enclosing CAN subsystem
///
/// The payload buffer is owned by the caller. The driver reads `sdu` on
/// transmission and writes it on reception, and never keeps it.
#[derive(Debug)]
pub struct Pdu<'a> {
    /// CAN identifier. Only the lowest 11 bits are used; higher bits are
    /// silently dropped.
    pub id: u32,
    /// Payload length in bytes, 0 to 8
    pub len: u8,
    /// Payload buffer
    pub sdu: &'a mut [u8],
}

impl<'a> Pdu<'a> {
    /// Create a PDU over a caller-owned buffer
    pub fn new(id: u32, len: u8, sdu: &'a mut [u8]) -> Self {
        Self { id, len, sdu }
    }

    /// The first `len` bytes of the buffer, or fewer if the buffer is short
    pub fn payload(&self) -> &[u8] {
        let len = usize::from(self.len).min(self.sdu.len());
        &self.sdu[..len]
    }
}

/// Capability set of a CAN controller, as consumed by the OS CAN subsystem
///
/// All operations are synchronous and execute on the calling context. The
/// `&mut self` receivers leave serialization of calls to the owner of the
/// driver value.
pub trait CanDriver {
    /// Controller configuration supplied at start of day
    type Config;
    /// Error type of all operations
    type Error;

    /// Bring the controller up and into communication mode
    fn init(&mut self, config: &Self::Config) -> Result<(), Self::Error>;

    /// Reconfigure the bit rate at runtime
    fn set_baud_rate(&mut self, config: &Self::Config) -> Result<(), Self::Error>;

    /// Hand a single frame to the hardware
    fn transmit(&mut self, pdu: &Pdu<'_>) -> Result<(), Self::Error>;

    /// Take a single frame from the hardware. Returns
    /// [`nb::Error::WouldBlock`] if there is none.
    fn receive(&mut self, pdu: &mut Pdu<'_>) -> nb::Result<(), Self::Error>;

    /// `true` if [`Self::receive`] would return a frame
    fn is_data_available(&self) -> bool;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payload_is_bounded_by_buffer() {
        let mut buffer = [1, 2, 3, 4];
        assert_eq!(Pdu::new(0, 2, &mut buffer).payload(), [1, 2]);
        assert_eq!(Pdu::new(0, 8, &mut buffer).payload(), [1, 2, 3, 4]);
        assert!(Pdu::new(0, 0, &mut buffer).payload().is_empty());
    }
}
