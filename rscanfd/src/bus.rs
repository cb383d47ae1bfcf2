//! Controller bring-up
//!
//! [`Rscanfd::init`] takes the peripheral from reset into channel
//! communication mode in a fixed order of steps. Every step that depends on
//! the effect of a previous one waits on the corresponding status flag first.
//! A failing step aborts the sequence; steps already taken are not undone.

use crate::config::{BitTimingError, CanConfig, PollLimit};
use crate::filter::{AcceptanceRule, RuleEntry};
use crate::poll::{wait_until, Timeout, WaitCondition};
use crate::protect::{modify_port, write_port, KeyGuard};
use crate::reg::can::*;
use crate::reg::port::{self, CanPins};
use crate::reg::{sysctl, Instance};
use rscanfd_core::{CanDriver, Pdu, RegisterAccess};

/// Errors reported by the driver
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// There is no CAN peripheral at the wrapped base address
    UnknownInstance(usize),
    /// Problems with the bit timing configuration
    BitTiming(BitTimingError),
    /// A status flag did not change within the configured [`PollLimit`]
    Timeout(WaitCondition),
    /// Payload length of a frame to transmit is above 8
    PayloadTooLong(u8),
    /// The caller's payload buffer is shorter than the frame
    BufferTooSmall {
        /// Payload length of the frame
        needed: usize,
        /// Length of the caller's buffer
        available: usize,
    },
    /// A received frame carries a data length code above 8. Its payload was
    /// discarded.
    MalformedLength(u8),
}

impl From<BitTimingError> for Error {
    fn from(value: BitTimingError) -> Self {
        Self::BitTiming(value)
    }
}

impl From<Timeout> for Error {
    fn from(Timeout(condition): Timeout) -> Self {
        Self::Timeout(condition)
    }
}

impl embedded_can::Error for Error {
    fn kind(&self) -> embedded_can::ErrorKind {
        embedded_can::ErrorKind::Other
    }
}

/// RS-CANFD controller, channel 0
///
/// Owns the register bus for its lifetime. All operations are synchronous
/// and require exclusive access, so a shared controller has to be wrapped in
/// whatever lock the owner uses.
pub struct Rscanfd<B> {
    pub(crate) bus: B,
    pub(crate) base: usize,
    pub(crate) poll_limit: PollLimit,
}

impl<B: RegisterAccess> Rscanfd<B> {
    /// Creates a controller for the peripheral at `base`.
    ///
    /// The base address is not checked until [`Self::init`], which fails
    /// with [`Error::UnknownInstance`] if it is not one of
    /// [`RSCFD0_BASE`](crate::reg::RSCFD0_BASE) or
    /// [`RSCFD1_BASE`](crate::reg::RSCFD1_BASE).
    pub fn new(base: usize, bus: B) -> Self {
        Self {
            bus,
            base,
            poll_limit: PollLimit::Unbounded,
        }
    }

    /// Peripheral instance this controller drives, if the base address is
    /// known.
    pub fn instance(&self) -> Option<Instance> {
        Instance::from_base(self.base)
    }

    /// Returns the register bus. The peripheral is left in whatever state it
    /// is in.
    pub fn release(self) -> B {
        self.bus
    }

    /// Raw access to the register bus
    ///
    /// # Safety
    /// Writes must not break the invariants the driver relies on: the mode
    /// of the peripheral, the layout of receive buffer 0 and transmit
    /// buffer 0, and the protection key registers being locked.
    pub unsafe fn registers(&mut self) -> &mut B {
        &mut self.bus
    }

    pub(crate) fn read(&self, offset: usize) -> u32 {
        self.bus.read32(self.base + offset)
    }

    pub(crate) fn write(&mut self, offset: usize, value: u32) {
        self.bus.write32(self.base + offset, value)
    }

    fn modify(&mut self, offset: usize, f: impl FnOnce(u32) -> u32) {
        self.bus.modify32(self.base + offset, f)
    }

    pub(crate) fn wait(
        &self,
        condition: WaitCondition,
        ready: impl Fn(&Self) -> bool,
    ) -> Result<(), Timeout> {
        wait_until(self.poll_limit, condition, || ready(self))
    }

    /// Brings the controller up and into communication mode.
    ///
    /// The base address and the whole `config` are validated before the
    /// first register access, so a rejected configuration leaves the
    /// hardware untouched.
    pub fn init(&mut self, config: &CanConfig) -> Result<(), Error> {
        let instance = self.instance().ok_or(Error::UnknownInstance(self.base))?;
        let ncfg = config.nominal_config()?;
        self.poll_limit = config.poll_limit;

        trace!("selecting PLL output as CPU clock");
        self.configure_clock()?;

        trace!("releasing module stop of {}", instance);
        self.release_module_stop(instance);

        trace!("waiting for message RAM initialization");
        self.wait(WaitCondition::RamInit, |can| {
            !Gsts(can.read(GSTS)).graminit()
        })?;

        trace!("entering global reset mode");
        self.modify(GCTR, |value| {
            let mut gctr = Gctr(value);
            gctr.set_gmdc(GlobalMode::Reset as u8);
            gctr.set_gslpr(false);
            gctr.0
        });
        self.wait(WaitCondition::GlobalReset, |can| {
            Gsts(can.read(GSTS)).grststs()
        })?;

        trace!("waking channel 0");
        self.modify(C0CTR, |value| {
            let mut ctr = Ctr(value);
            ctr.set_cslpr(false);
            ctr.0
        });
        self.wait(WaitCondition::ChannelAwake, |can| {
            !Sts(can.read(C0STS)).cslpsts()
        })?;

        trace!("nominal bit timing {:#x}", ncfg.0);
        self.write(C0NCFG, ncfg.0);

        trace!("configuring acceptance rules");
        self.configure_rules(&[AcceptanceRule::accept_all_into_buffer(0)]);

        self.write(RMNB, {
            let mut rmnb = Rmnb(0);
            rmnb.set_nrxmb(1);
            rmnb.set_rmpls(RMPLS_64_BYTES);
            rmnb.0
        });

        trace!("entering global operating mode");
        self.modify(GCTR, |value| {
            let mut gctr = Gctr(value);
            gctr.set_gmdc(GlobalMode::Operating as u8);
            gctr.0
        });
        self.wait(WaitCondition::GlobalOperating, |can| {
            can.read(GSTS) & GSTS_MODE_MASK == 0
        })?;

        trace!("entering channel communication mode");
        self.modify(C0CTR, |value| {
            let mut ctr = Ctr(value);
            ctr.set_chmdc(ChannelMode::Communication as u8);
            ctr.0
        });
        self.wait(WaitCondition::ChannelCommunication, |can| {
            !Sts(can.read(C0STS)).crststs()
        })?;

        trace!("routing pins to the peripheral");
        self.configure_pins(instance.pins());
        Ok(())
    }

    /// Runtime bit rate changes are not supported; the bit rate given to
    /// [`Self::init`] stays in effect.
    pub fn set_baud_rate(&mut self, _config: &CanConfig) -> Result<(), Error> {
        Ok(())
    }

    fn configure_clock(&mut self) -> Result<(), Timeout> {
        let limit = self.poll_limit;
        let mut clkc = KeyGuard::unlock(&mut self.bus, sysctl::CLKKCPROT1);
        clkc.write32(sysctl::CKSC_CPUC, sysctl::CKSC_CPUC_PLLO);
        wait_until(limit, WaitCondition::PllSync, || {
            clkc.read32(sysctl::CLKD_PLLS) & sysctl::PLLCLKDSYNC != 0
        })?;
        wait_until(limit, WaitCondition::ClockSwitch, || {
            clkc.read32(sysctl::CKSC_CPUS) & sysctl::CPUCLKSACT == 0
        })?;
        Ok(())
    }

    fn release_module_stop(&mut self, instance: Instance) {
        let stbc = KeyGuard::unlock(&mut self.bus, sysctl::STBCKCPROT);
        let mut msr = KeyGuard::unlock(stbc, sysctl::MSRKCPROT);
        msr.modify32(sysctl::MSR_RSCANFD, |value| {
            value & !instance.module_stop_mask()
        });
    }

    /// Replaces the rule table of channel 0 with `rules`.
    ///
    /// Only valid in global reset mode.
    fn configure_rules(&mut self, rules: &[AcceptanceRule]) {
        self.modify(GCFG, |value| {
            let mut gcfg = Gcfg(value);
            gcfg.set_dce(false);
            gcfg.0
        });

        let mut ectr = Gaflectr(0);
        ectr.set_aflpn(0);
        ectr.set_afldae(true);
        self.write(GAFLECTR, ectr.0);

        self.modify(GAFLCFG0, |value| {
            let mut cfg = Gaflcfg0(value);
            cfg.set_rnc0(rules.len() as u8);
            cfg.0
        });
        for (index, rule) in rules.iter().enumerate() {
            let entry = RuleEntry::from(*rule);
            for (word, value) in entry.words().into_iter().enumerate() {
                self.write(gafl(index, word), value);
            }
        }

        ectr.set_afldae(false);
        self.write(GAFLECTR, ectr.0);
    }

    fn configure_pins(&mut self, pins: CanPins) {
        let group = pins.group;
        let code = pins.function.code();
        let function_bits = [port::pfc(group), port::pfce(group), port::pfcae(group)];
        for (bit, register) in function_bits.into_iter().enumerate() {
            let set = code & (1 << bit) != 0;
            modify_port(&mut self.bus, group, register, pins.mask(), set);
        }

        let pm = self.bus.read32(port::pm(group));
        write_port(
            &mut self.bus,
            group,
            port::pm(group),
            (pm & !pins.tx_mask()) | pins.rx_mask(),
        );

        modify_port(&mut self.bus, group, port::pmc(group), pins.mask(), true);
    }
}

impl<B: RegisterAccess> CanDriver for Rscanfd<B> {
    type Config = CanConfig;
    type Error = Error;

    fn init(&mut self, config: &CanConfig) -> Result<(), Error> {
        Rscanfd::init(self, config)
    }

    fn set_baud_rate(&mut self, config: &CanConfig) -> Result<(), Error> {
        Rscanfd::set_baud_rate(self, config)
    }

    fn transmit(&mut self, pdu: &Pdu<'_>) -> Result<(), Error> {
        Rscanfd::transmit(self, pdu)
    }

    fn receive(&mut self, pdu: &mut Pdu<'_>) -> nb::Result<(), Error> {
        Rscanfd::receive(self, pdu)
    }

    fn is_data_available(&self) -> bool {
        Rscanfd::is_data_available(self)
    }
}
