//! `embedded-can` frames
//!
//! [`Frame`] is an owned classic CAN data frame with a standard identifier,
//! the only kind of frame the controller sends and receives. Through it
//! [`Rscanfd`] implements [`embedded_can::nb::Can`].

use crate::bus::{Error, Rscanfd};
use crate::tx::MAX_PAYLOAD;
use embedded_can::{Id, StandardId};
use rscanfd_core::{Pdu, RegisterAccess};

/// Classic CAN data frame with an 11-bit identifier
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    id: StandardId,
    len: u8,
    data: [u8; MAX_PAYLOAD as usize],
}

impl Frame {
    /// Standard identifier of the frame
    pub fn standard_id(&self) -> StandardId {
        self.id
    }
}

impl embedded_can::Frame for Frame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        let Id::Standard(id) = id.into() else {
            return None;
        };
        if data.len() > usize::from(MAX_PAYLOAD) {
            return None;
        }
        let mut frame = Self {
            id,
            len: data.len() as u8,
            data: [0; MAX_PAYLOAD as usize],
        };
        frame.data[..data.len()].copy_from_slice(data);
        Some(frame)
    }

    /// Remote frames cannot be sent
    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        false
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        Id::Standard(self.id)
    }

    fn dlc(&self) -> usize {
        self.len.into()
    }

    fn data(&self) -> &[u8] {
        &self.data[..usize::from(self.len)]
    }
}

impl<B: RegisterAccess> embedded_can::nb::Can for Rscanfd<B> {
    type Frame = Frame;
    type Error = Error;

    /// Queues `frame` unless a previous frame is still pending. Pending
    /// frames are never replaced, so `Ok(None)` is the only success.
    fn transmit(&mut self, frame: &Frame) -> nb::Result<Option<Frame>, Error> {
        let mut data = frame.data;
        let pdu = Pdu::new(frame.id.as_raw().into(), frame.len, &mut data);
        self.try_transmit(&pdu)?;
        Ok(None)
    }

    fn receive(&mut self) -> nb::Result<Frame, Error> {
        let mut data = [0; MAX_PAYLOAD as usize];
        let mut pdu = Pdu::new(0, 0, &mut data);
        Rscanfd::receive(self, &mut pdu)?;
        let (id, len) = (pdu.id, pdu.len);
        Ok(Frame {
            // Masked to 11 bits on reception
            id: StandardId::new(id as u16).unwrap_or(StandardId::MAX),
            len,
            data,
        })
    }
}
