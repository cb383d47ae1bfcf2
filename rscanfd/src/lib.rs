#![no_std]
#![warn(missing_docs)]
//! # RS-CANFD
//!
//! ## Overview
//! This crate provides a classic CAN driver for the RS-CANFD peripheral,
//! written against register access only.
//!
//! It provides the following features:
//!
//! - clock, standby and pin bring-up of the peripheral
//! - nominal bit timing computation with range checks on every field
//! - transmission of standard data frames through transmit buffer 0
//! - reception of every standard data frame through receive buffer 0
//! - the [`CanDriver`] capability set for an enclosing OS CAN subsystem and
//!   [`embedded_can::nb::Can`] for everything else
//!
//! Only channel 0 of an instance is used and the controller is always run in
//! classic mode. Receive FIFOs and interrupts are not used; reception is
//! polled with [`Rscanfd::is_data_available`].
//!
//! The driver never touches memory directly. Every access goes through
//! [`RegisterAccess`], which target code implements with [`Mmio`] and host
//! tests with a simulated register file.
//!
//! ## Bring-up
//!
//! [`Rscanfd::init`] selects the PLL as CPU clock, releases the module stop
//! of the instance, waits for the message RAM, programs bit timing,
//! acceptance rules and receive buffers in global reset mode, switches the
//! peripheral and channel 0 into operation and finally routes the CAN pins.
//! Writes to the clock, standby and port registers are unlocked only for the
//! duration of the access.
//!
//! Waits on status flags spin without limit by default, see
//! [`PollLimit`].
//!
//! ## General usage example
//!
//! ```no_run
//! use fugit::RateExtU32 as _;
//! use rscanfd::bus::Rscanfd;
//! use rscanfd::config::{CanConfig, PollLimit};
//! use rscanfd::core::{Mmio, Pdu};
//! use rscanfd::reg::RSCFD0_BASE;
//!
//! // Safety: nothing else touches the CAN, clock, standby and port blocks
//! let bus = unsafe { Mmio::new() };
//! let mut can = Rscanfd::new(RSCFD0_BASE, bus);
//!
//! let mut config = CanConfig::new(500.kHz());
//! config.nominal_timing.phase_seg_1 = 13;
//! config.nominal_timing.phase_seg_2 = 2;
//! config.poll_limit = PollLimit::Attempts(100_000);
//! can.init(&config).unwrap();
//!
//! let mut payload = [0x11, 0x22, 0x33];
//! can.transmit(&Pdu::new(0x123, 3, &mut payload)).unwrap();
//!
//! let mut buffer = [0; 8];
//! let mut pdu = Pdu::new(0, 0, &mut buffer);
//! loop {
//!     match can.receive(&mut pdu) {
//!         Ok(()) => break,
//!         Err(nb::Error::WouldBlock) => continue,
//!         Err(nb::Error::Other(e)) => panic!("{:?}", e),
//!     }
//! }
//! ```
//!
//! [`CanDriver`]: rscanfd_core::CanDriver
//! [`RegisterAccess`]: rscanfd_core::RegisterAccess
//! [`Mmio`]: rscanfd_core::Mmio
//! [`Rscanfd::init`]: crate::bus::Rscanfd::init
//! [`Rscanfd::is_data_available`]: crate::bus::Rscanfd::is_data_available
//! [`PollLimit`]: crate::config::PollLimit

#[macro_use]
mod fmt;

pub mod bus;
pub mod config;
pub mod filter;
pub mod message;
pub mod poll;
pub mod prelude;
mod protect;
pub mod reg;
pub mod rx;
pub mod tx;

#[cfg(test)]
mod sim;

pub use embedded_can;
pub use rscanfd_core as core;
