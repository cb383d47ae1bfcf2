//! Reception through receive buffer 0

use crate::bus::{Error, Rscanfd};
use crate::reg::can::*;
use crate::tx::MAX_PAYLOAD;
use rscanfd_core::{Pdu, RegisterAccess};

impl<B: RegisterAccess> Rscanfd<B> {
    /// `true` if receive buffer 0 holds a frame not yet taken by
    /// [`Self::receive`]. Only reads the new data flag.
    pub fn is_data_available(&self) -> bool {
        self.read(RMND0) & RMND_BUFFER_0 != 0
    }

    /// Takes the frame held by receive buffer 0.
    ///
    /// Fails with [`nb::Error::WouldBlock`] if there is none; `pdu` is left
    /// untouched then. Otherwise `pdu.id` and `pdu.len` are always updated
    /// and the buffer is handed back to the hardware, also when an error is
    /// returned:
    /// - [`Error::MalformedLength`] if the data length code is above 8. No
    ///   payload is copied.
    /// - [`Error::BufferTooSmall`] if `pdu.sdu` cannot hold the payload.
    ///   Only the leading bytes that fit are copied.
    pub fn receive(&mut self, pdu: &mut Pdu<'_>) -> nb::Result<(), Error> {
        if !self.is_data_available() {
            return Err(nb::Error::WouldBlock);
        }
        let result = self.read_buffer(pdu);
        self.release_buffer();
        result.map_err(nb::Error::Other)
    }

    fn read_buffer(&self, pdu: &mut Pdu<'_>) -> Result<(), Error> {
        pdu.id = Id(self.read(RMID0)).id() & STANDARD_ID_MASK;
        let dlc = Ptr(self.read(RMPTR0)).dlc();
        pdu.len = dlc;
        if dlc > MAX_PAYLOAD {
            trace!("dropping payload of {:#x}, dlc {}", pdu.id, dlc);
            return Err(Error::MalformedLength(dlc));
        }

        let len = usize::from(dlc);
        let available = pdu.sdu.len();
        // The data field only tolerates byte accesses
        for (i, byte) in pdu.sdu.iter_mut().take(len).enumerate() {
            *byte = self.bus.read8(self.base + RMDF0 + i);
        }
        if available < len {
            return Err(Error::BufferTooSmall {
                needed: len,
                available,
            });
        }
        Ok(())
    }

    /// Clears the new data flag of receive buffer 0. Flags are cleared by
    /// writing 0; the flags of the other buffers are written 1 and stay as
    /// they are.
    fn release_buffer(&mut self) {
        self.write(RMND0, !RMND_BUFFER_0);
    }
}
