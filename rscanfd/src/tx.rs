//! Transmission through transmit buffer 0

use crate::bus::{Error, Rscanfd};
use crate::poll::WaitCondition;
use crate::reg::can::*;
use rscanfd_core::{Pdu, RegisterAccess};

/// Largest payload of a classic CAN data frame
pub const MAX_PAYLOAD: u8 = 8;

impl<B: RegisterAccess> Rscanfd<B> {
    /// Queues a standard data frame for transmission.
    ///
    /// Waits for a previous request on the transmit buffer to complete,
    /// then fills the buffer and requests transmission. Returns as soon as
    /// the request is issued; the frame is not yet on the bus.
    ///
    /// Only the lowest 11 bits of `pdu.id` are used.
    pub fn transmit(&mut self, pdu: &Pdu<'_>) -> Result<(), Error> {
        check_payload(pdu)?;
        self.wait(WaitCondition::TransmitIdle, |can| !can.is_transmit_pending())?;
        self.write_frame(pdu);
        Ok(())
    }

    /// Queues a standard data frame for transmission, unless the transmit
    /// buffer still holds a pending request.
    pub fn try_transmit(&mut self, pdu: &Pdu<'_>) -> nb::Result<(), Error> {
        check_payload(pdu)?;
        if self.is_transmit_pending() {
            return Err(nb::Error::WouldBlock);
        }
        self.write_frame(pdu);
        Ok(())
    }

    /// `true` while the last transmission request has not completed
    pub fn is_transmit_pending(&self) -> bool {
        Tmsts(self.bus.read8(self.base + TMSTS0)).tmtrm()
    }

    fn write_frame(&mut self, pdu: &Pdu<'_>) {
        let base = self.base;
        self.bus.write8(base + TMSTS0, 0);

        let mut id = Id(0);
        id.set_id(pdu.id & STANDARD_ID_MASK);
        self.write(TMID0, id.0);

        let mut ptr = Ptr(0);
        ptr.set_dlc(pdu.len);
        self.write(TMPTR0, ptr.0);

        // The data field only tolerates byte accesses
        for (i, byte) in pdu.payload().iter().enumerate() {
            self.bus.write8(base + TMDF0 + i, *byte);
        }

        self.write(TMFDCTR0, Fdctr(0).0);

        let mut tmc = Tmc(0);
        tmc.set_tmtr(true);
        self.bus.write8(base + TMC0, tmc.0);
        trace!("transmission of {:#x} requested", pdu.id & STANDARD_ID_MASK);
    }
}

fn check_payload(pdu: &Pdu<'_>) -> Result<(), Error> {
    if pdu.len > MAX_PAYLOAD {
        return Err(Error::PayloadTooLong(pdu.len));
    }
    if usize::from(pdu.len) > pdu.sdu.len() {
        return Err(Error::BufferTooSmall {
            needed: pdu.len.into(),
            available: pdu.sdu.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    extern crate std;

    use super::*;
    use crate::config::{CanConfig, PollLimit};
    use crate::reg::RSCFD0_BASE;
    use crate::sim::{Access, SimulatedBus};
    use fugit::RateExtU32;
    use std::vec::Vec;

    fn can() -> Rscanfd<SimulatedBus> {
        let mut can = Rscanfd::new(RSCFD0_BASE, SimulatedBus::instance0());
        can.init(&CanConfig::new(500.kHz())).unwrap();
        can.bus.clear_log();
        can
    }

    fn buffer_writes(bus: &SimulatedBus) -> Vec<(usize, u32)> {
        bus.writes()
            .into_iter()
            .filter(|(address, _)| (RSCFD0_BASE + TMID0..RSCFD0_BASE + TMDF0 + 8).contains(address))
            .collect()
    }

    #[test]
    fn frame_layout() {
        let mut can = can();
        let mut payload = [1, 2, 3, 4, 5, 6, 7];
        can.transmit(&Pdu::new(0x123, 7, &mut payload)).unwrap();

        let bus = can.release();
        assert_eq!(bus.writes_to(RSCFD0_BASE + TMID0), [0x123]);
        assert_eq!(bus.writes_to(RSCFD0_BASE + TMPTR0), [7 << 28]);
        assert_eq!(bus.writes_to(RSCFD0_BASE + TMFDCTR0), [0]);
        assert_eq!(bus.writes_to(RSCFD0_BASE + TMC0), [1]);
        assert_eq!(bus.sent.len(), 1);
        assert_eq!(bus.sent[0].tmid, 0x123);
        assert_eq!(bus.sent[0].dlc, 7);
        assert_eq!(bus.sent[0].data, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn status_is_cleared_before_the_buffer_is_filled() {
        let mut can = can();
        can.transmit(&Pdu::new(0x1, 0, &mut [])).unwrap();
        let writes = can.release().writes();
        assert_eq!(writes.first(), Some(&(RSCFD0_BASE + TMSTS0, 0)));
        assert_eq!(writes.last(), Some(&(RSCFD0_BASE + TMC0, 1)));
    }

    #[test]
    fn identifier_is_truncated_to_11_bits() {
        let mut can = can();
        can.transmit(&Pdu::new(0x1FFF, 0, &mut [])).unwrap();
        assert_eq!(can.release().writes_to(RSCFD0_BASE + TMID0), [0x7FF]);
    }

    #[test]
    fn payload_is_copied_bytewise() {
        for len in 0..=8u8 {
            let mut can = can();
            let mut payload: Vec<u8> = (0..len).map(|i| 0xA0 + i).collect();
            payload.push(0xEE);
            can.transmit(&Pdu::new(0x55, len, &mut payload)).unwrap();

            let bus = can.release();
            let data: Vec<_> = bus
                .log()
                .into_iter()
                .filter_map(|access| match access {
                    Access::Write8(address, value)
                        if (RSCFD0_BASE + TMDF0..RSCFD0_BASE + TMDF0 + 8).contains(&address) =>
                    {
                        Some((address - RSCFD0_BASE - TMDF0, value))
                    }
                    Access::Write32(address, _) => {
                        assert!(!(RSCFD0_BASE + TMDF0..RSCFD0_BASE + TMDF0 + 8).contains(&address));
                        None
                    }
                    _ => None,
                })
                .collect();
            let expected: Vec<_> = (0..len).map(|i| (usize::from(i), 0xA0 + i)).collect();
            assert_eq!(data, expected);
        }
    }

    #[test]
    fn oversized_payload_is_rejected_untouched() {
        let mut can = can();
        let mut payload = [0; 9];
        assert_eq!(
            can.transmit(&Pdu::new(0x1, 9, &mut payload)),
            Err(Error::PayloadTooLong(9))
        );
        let bus = can.release();
        assert!(buffer_writes(&bus).is_empty());
        assert!(bus.writes_to(RSCFD0_BASE + TMC0).is_empty());
    }

    #[test]
    fn short_buffer_is_rejected_untouched() {
        let mut can = can();
        let mut payload = [0; 3];
        assert_eq!(
            can.transmit(&Pdu::new(0x1, 4, &mut payload)),
            Err(Error::BufferTooSmall {
                needed: 4,
                available: 3
            })
        );
        assert!(can.release().writes().is_empty());
    }

    #[test]
    fn waits_for_previous_request() {
        let mut can = can();
        can.bus.hold_transmission = true;
        can.poll_limit = PollLimit::Attempts(4);

        can.transmit(&Pdu::new(0x1, 0, &mut [])).unwrap();
        assert!(can.is_transmit_pending());
        assert_eq!(
            can.transmit(&Pdu::new(0x2, 0, &mut [])),
            Err(Error::Timeout(WaitCondition::TransmitIdle))
        );
        assert_eq!(can.bus.writes_to(RSCFD0_BASE + TMID0), [0x1]);

        can.bus.complete_transmission();
        can.transmit(&Pdu::new(0x2, 0, &mut [])).unwrap();
        assert_eq!(can.bus.writes_to(RSCFD0_BASE + TMID0), [0x1, 0x2]);
    }

    #[test]
    fn try_transmit_does_not_wait() {
        let mut can = can();
        can.bus.hold_transmission = true;
        can.try_transmit(&Pdu::new(0x1, 0, &mut [])).unwrap();
        assert_eq!(
            can.try_transmit(&Pdu::new(0x2, 0, &mut [])),
            Err(nb::Error::WouldBlock)
        );
        assert_eq!(
            can.try_transmit(&Pdu::new(0x2, 9, &mut [0; 9])),
            Err(nb::Error::Other(Error::PayloadTooLong(9)))
        );
    }
}
