//! Simulated register file for host tests
//!
//! Registers live in a sparse little-endian byte store and every access is
//! recorded. The handshakes the driver relies on are emulated: mode requests
//! are reflected in the status registers, message RAM initialization finishes
//! after a few status reads, `RMND0` is cleared by writing zero and a
//! transmission request completes immediately.

extern crate std;

use crate::poll::WaitCondition;
use crate::reg::can::*;
use crate::reg::{sysctl, RSCFD0_BASE};
use core::cell::{Cell, RefCell};
use rscanfd_core::RegisterAccess;
use std::collections::BTreeMap;
use std::vec::Vec;

/// A single register access
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Read32(usize),
    Write32(usize, u32),
    Read8(usize),
    Write8(usize, u8),
}

/// A frame handed to the simulated transmitter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentFrame {
    pub tmid: u32,
    pub dlc: u8,
    pub data: Vec<u8>,
}

pub struct SimulatedBus {
    base: usize,
    memory: RefCell<BTreeMap<usize, u8>>,
    log: RefCell<Vec<Access>>,
    ram_init_reads: Cell<u32>,
    /// Status that never reaches the state the driver waits for
    pub stuck: Option<WaitCondition>,
    /// Keep transmission requests pending instead of completing them
    pub hold_transmission: bool,
    pub sent: Vec<SentFrame>,
}

impl SimulatedBus {
    /// Peripheral at `base` right after reset
    pub fn new(base: usize) -> Self {
        let mut bus = Self {
            base,
            memory: RefCell::new(BTreeMap::new()),
            log: RefCell::new(Vec::new()),
            ram_init_reads: Cell::new(3),
            stuck: None,
            hold_transmission: false,
            sent: Vec::new(),
        };
        bus.poke32(sysctl::CLKD_PLLS, sysctl::PLLCLKDSYNC);
        bus.poke32(sysctl::MSR_RSCANFD, 0b11);
        bus.poke32(base + GCTR, 0b101);
        bus.poke32(base + GSTS, 0b1101);
        bus.poke32(base + C0CTR, 0b101);
        bus.poke32(base + C0STS, 0b101);
        bus.poke32(base + GCFG, 0b10);
        bus
    }

    pub fn instance0() -> Self {
        Self::new(RSCFD0_BASE)
    }

    /// Set a register without logging or side effects
    pub fn poke32(&mut self, address: usize, value: u32) {
        let mut memory = self.memory.borrow_mut();
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            memory.insert(address + i, byte);
        }
    }

    /// Read a register without logging or side effects
    pub fn peek32(&self, address: usize) -> u32 {
        let memory = self.memory.borrow();
        let bytes = core::array::from_fn(|i| memory.get(&(address + i)).copied().unwrap_or(0));
        u32::from_le_bytes(bytes)
    }

    pub fn peek8(&self, address: usize) -> u8 {
        self.memory.borrow().get(&address).copied().unwrap_or(0)
    }

    pub fn poke8(&mut self, address: usize, value: u8) {
        self.memory.borrow_mut().insert(address, value);
    }

    /// Place a frame in receive buffer 0 and raise its new data flag
    pub fn deliver(&mut self, id: u32, dlc: u8, data: &[u8]) {
        let base = self.base;
        self.poke32(base + RMID0, id);
        self.poke32(base + RMPTR0, u32::from(dlc) << 28);
        for (i, byte) in data.iter().enumerate() {
            self.poke8(base + RMDF0 + i, *byte);
        }
        let rmnd = self.peek32(base + RMND0);
        self.poke32(base + RMND0, rmnd | RMND_BUFFER_0);
    }

    pub fn log(&self) -> Vec<Access> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&mut self) {
        self.log.borrow_mut().clear();
    }

    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|access| match *access {
                Access::Write32(address, value) => Some((address, value)),
                Access::Write8(address, value) => Some((address, value.into())),
                _ => None,
            })
            .collect()
    }

    pub fn writes_to(&self, address: usize) -> Vec<u32> {
        self.writes()
            .into_iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, value)| value)
            .collect()
    }

    /// Position of the first write to `address` in the write sequence
    pub fn first_write(&self, address: usize) -> Option<usize> {
        self.writes().iter().position(|(a, _)| *a == address)
    }

    fn status_override(&self, address: usize, value: u32) -> u32 {
        let base = self.base;
        match (self.stuck, address) {
            (Some(WaitCondition::PllSync), sysctl::CLKD_PLLS) => value & !sysctl::PLLCLKDSYNC,
            (Some(WaitCondition::ClockSwitch), sysctl::CKSC_CPUS) => value | sysctl::CPUCLKSACT,
            (Some(WaitCondition::RamInit), a) if a == base + GSTS => value | 1 << 3,
            (Some(WaitCondition::GlobalReset), a) if a == base + GSTS => value & !1,
            (Some(WaitCondition::GlobalOperating), a) if a == base + GSTS => value | 1,
            (Some(WaitCondition::ChannelAwake), a) if a == base + C0STS => value | 1 << 2,
            (Some(WaitCondition::ChannelCommunication), a) if a == base + C0STS => value | 1,
            (Some(WaitCondition::TransmitIdle), a) if a == base + TMSTS0 => value | 1 << 3,
            _ => value,
        }
    }

    fn after_read(&self, address: usize) {
        if address == self.base + GSTS && self.ram_init_reads.get() > 0 {
            let left = self.ram_init_reads.get() - 1;
            self.ram_init_reads.set(left);
            if left == 0 {
                let mut memory = self.memory.borrow_mut();
                let gsts = memory.entry(address).or_insert(0);
                *gsts &= !(1 << 3);
            }
        }
    }

    fn after_write(&mut self, address: usize) {
        let base = self.base;
        if address == base + GCTR {
            let gctr = Gctr(self.peek32(address));
            let graminit = self.peek32(base + GSTS) & 1 << 3;
            let gsts = u32::from(gctr.gmdc() == GlobalMode::Reset as u8)
                | u32::from(gctr.gmdc() == GlobalMode::Halt as u8) << 1
                | u32::from(gctr.gslpr()) << 2
                | graminit;
            self.poke32(base + GSTS, gsts);
        } else if address == base + C0CTR {
            let ctr = Ctr(self.peek32(address));
            let communicating = ctr.chmdc() == ChannelMode::Communication as u8 && !ctr.cslpr();
            let sts = u32::from(ctr.chmdc() == ChannelMode::Reset as u8)
                | u32::from(ctr.chmdc() == ChannelMode::Halt as u8) << 1
                | u32::from(ctr.cslpr()) << 2
                | u32::from(communicating) << 7;
            self.poke32(base + C0STS, sts);
        } else if address == base + TMC0 && Tmc(self.peek8(address)).tmtr() {
            if self.hold_transmission {
                self.poke8(base + TMSTS0, 1 << 3);
            } else {
                let tmid = self.peek32(base + TMID0);
                let dlc = Ptr(self.peek32(base + TMPTR0)).dlc();
                let data = (0..usize::from(dlc.min(8)))
                    .map(|i| self.peek8(base + TMDF0 + i))
                    .collect();
                self.sent.push(SentFrame { tmid, dlc, data });
                self.poke8(base + TMC0, 0);
                self.poke8(base + TMSTS0, 0b01 << 1);
            }
        }
    }

    /// Complete a transmission held by `hold_transmission`
    pub fn complete_transmission(&mut self) {
        let address = self.base + TMSTS0;
        self.poke8(address, 0b01 << 1);
    }
}

impl RegisterAccess for SimulatedBus {
    fn read32(&self, address: usize) -> u32 {
        self.log.borrow_mut().push(Access::Read32(address));
        let value = self.status_override(address, self.peek32(address));
        self.after_read(address);
        value
    }

    fn write32(&mut self, address: usize, value: u32) {
        self.log.borrow_mut().push(Access::Write32(address, value));
        let value = if address == self.base + RMND0 {
            // Flags are cleared by writing 0, writing 1 has no effect
            self.peek32(address) & value
        } else {
            value
        };
        self.poke32(address, value);
        self.after_write(address);
    }

    fn read8(&self, address: usize) -> u8 {
        self.log.borrow_mut().push(Access::Read8(address));
        let value = self.status_override(address, self.peek8(address).into()) as u8;
        self.after_read(address);
        value
    }

    fn write8(&mut self, address: usize, value: u8) {
        self.log.borrow_mut().push(Access::Write8(address, value));
        self.poke8(address, value);
        self.after_write(address);
    }
}
