//! CAN bus configuration

use crate::reg::can::Ncfg;
use core::ops::RangeInclusive;
use fugit::{HertzU32, KilohertzU32, RateExtU32};

/// Highest nominal bit rate of classic CAN
pub const MAX_CLASSIC_BITRATE: KilohertzU32 = KilohertzU32::from_raw(1_000);
/// Highest data phase bit rate of CAN FD
pub const MAX_FD_BITRATE: KilohertzU32 = KilohertzU32::from_raw(8_000);
/// Frequency of the CAN peripheral clock on the reference board
pub const DEFAULT_CAN_CLOCK: HertzU32 = HertzU32::from_raw(80_000_000);

/// Configuration for the CAN controller
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanConfig {
    /// Bit timing parameters of the arbitration (and, for classic frames,
    /// the whole) phase.
    pub nominal_timing: BitTiming,
    /// Bit timing parameters of the data phase of bit rate switched FD
    /// frames.
    ///
    /// Validated, but not applied to the hardware: the controller is always
    /// run in classic mode.
    pub fd: Option<BitTiming>,
    /// Frequency of the clock feeding the CAN peripheral
    pub can_clock: HertzU32,
    /// Upper bound of every wait on a hardware status flag
    pub poll_limit: PollLimit,
}

impl CanConfig {
    /// Create an instance
    ///
    /// Nominal bitrate value must be provided, all other settings come
    /// pre-populated with default values.
    pub fn new(bitrate: KilohertzU32) -> Self {
        Self {
            nominal_timing: BitTiming::new(bitrate),
            fd: None,
            can_clock: DEFAULT_CAN_CLOCK,
            poll_limit: Default::default(),
        }
    }

    /// Validates the whole configuration and computes the nominal bit rate
    /// register value.
    pub fn nominal_config(&self) -> Result<Ncfg, BitTimingError> {
        if self.nominal_timing.bitrate > MAX_CLASSIC_BITRATE {
            return Err(BitTimingError::BitRateOutOfRange(
                0.kHz()..=MAX_CLASSIC_BITRATE,
            ));
        }
        if let Some(fd) = &self.fd {
            if fd.bitrate > MAX_FD_BITRATE {
                return Err(BitTimingError::FdBitRateOutOfRange(0.kHz()..=MAX_FD_BITRATE));
            }
        }
        self.nominal_timing.nominal_config(self.can_clock)
    }
}

/// How long to wait for a hardware status flag
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollLimit {
    /// Wait until the flag changes, however long it takes
    #[default]
    Unbounded,
    /// Give up after reading the flag this many times
    Attempts(u32),
}

/// Bit-timing parameters
///
/// The bit time is determined by
/// - the time quantum `t_q`, which is the period of the peripheral clock
///   divided by the prescaler
/// - the number of time quanta in a bit time, `1 + prop_seg + phase_seg_1 +
///   phase_seg_2`
///
/// The prescaler is derived from the bit rate and truncated, so a bit rate
/// that does not divide the peripheral clock evenly ends up slightly faster
/// than requested. Tune `prop_seg` to compensate.
///
/// Default values are:
/// - sjw: 0x4
/// - prop_seg: 0x0
/// - phase_seg_1: 0xB
/// - phase_seg_2: 0x4
///
/// Default time quanta in a bit time is 16.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    /// Synchronization jump width
    pub sjw: u8,
    /// Propagation segment. Only enters the prescaler computation.
    pub prop_seg: u8,
    /// Phase time before sample point
    pub phase_seg_1: u8,
    /// Time after sample point
    pub phase_seg_2: u8,
    /// The bitrate of the bus
    pub bitrate: KilohertzU32,
}

impl BitTiming {
    /// Create an instance
    ///
    /// Bitrate value must be provided, all other settings come pre-populated
    /// with default values.
    pub fn new(bitrate: KilohertzU32) -> Self {
        Self {
            sjw: 0x4,
            prop_seg: 0x0,
            phase_seg_1: 0xB,
            phase_seg_2: 0x4,
            bitrate,
        }
    }

    /// Returns the number of time quanta that make up one bit time, `t_bit /
    /// t_q`
    pub fn time_quanta_per_bit(&self) -> u32 {
        1 + u32::from(self.prop_seg) + u32::from(self.phase_seg_1) + u32::from(self.phase_seg_2)
    }

    /// Computes the value of the prescaler field: `f_can / (bitrate *
    /// time_quanta_per_bit) - 1`, truncating.
    pub fn prescaler(&self, f_can: HertzU32) -> Result<u32, BitTimingError> {
        let bitrate = u64::from(self.bitrate.raw()) * 1000;
        if bitrate == 0 {
            return Err(BitTimingError::ZeroBitRate);
        }
        let f_q = bitrate * u64::from(self.time_quanta_per_bit());
        let divider = u64::from(f_can.to_Hz()) / f_q;
        // `divider` never exceeds `f_can`, a `u32`
        match divider.checked_sub(1) {
            Some(prescaler) => Ok(prescaler as u32),
            None => Err(BitTimingError::PrescalerUnderflow {
                can_clock: f_can,
                bitrate: self.bitrate,
                bit_time_quanta: self.time_quanta_per_bit(),
            }),
        }
    }

    /// Computes the nominal bit rate register value for a peripheral clocked
    /// at `f_can`.
    pub fn nominal_config(&self, f_can: HertzU32) -> Result<Ncfg, BitTimingError> {
        let prescaler = self.prescaler(f_can)?;
        check(NBRP_RANGE, prescaler, BitTimingError::PrescalerOutOfRange)?;
        check(NSJW_RANGE, self.sjw.into(), BitTimingError::SynchronizationJumpWidthOutOfRange)?;
        check(NTSEG1_RANGE, self.phase_seg_1.into(), BitTimingError::PhaseSeg1OutOfRange)?;
        check(NTSEG2_RANGE, self.phase_seg_2.into(), BitTimingError::PhaseSeg2OutOfRange)?;

        let mut ncfg = Ncfg(0);
        ncfg.set_nbrp(prescaler as u16);
        ncfg.set_nsjw(self.sjw);
        ncfg.set_ntseg1(self.phase_seg_1);
        ncfg.set_ntseg2(self.phase_seg_2);
        Ok(ncfg)
    }
}

const NBRP_RANGE: RangeInclusive<u32> = 0..=1023;
const NSJW_RANGE: RangeInclusive<u32> = 0..=127;
const NTSEG1_RANGE: RangeInclusive<u32> = 0..=255;
const NTSEG2_RANGE: RangeInclusive<u32> = 0..=127;

fn check(
    valid: RangeInclusive<u32>,
    value: u32,
    error: fn(RangeInclusive<u32>) -> BitTimingError,
) -> Result<(), BitTimingError> {
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(error(valid))
    }
}

/// Misconfigurations of [`CanConfig`] and [`BitTiming`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitTimingError {
    /// Nominal bitrate is outside the wrapped `RangeInclusive`
    BitRateOutOfRange(RangeInclusive<KilohertzU32>),
    /// FD data phase bitrate is outside the wrapped `RangeInclusive`
    FdBitRateOutOfRange(RangeInclusive<KilohertzU32>),
    /// Bitrate is zero
    ZeroBitRate,
    /// The bit time is longer than a period of the peripheral clock allows
    PrescalerUnderflow {
        /// Provided peripheral clock
        can_clock: HertzU32,
        /// Bitrate requested in [`BitTiming`]
        bitrate: KilohertzU32,
        /// Time quanta per bit selected by [`BitTiming`]
        bit_time_quanta: u32,
    },
    /// Prescaler field value is outside the wrapped `RangeInclusive`
    PrescalerOutOfRange(RangeInclusive<u32>),
    /// SJW is outside the wrapped `RangeInclusive`
    SynchronizationJumpWidthOutOfRange(RangeInclusive<u32>),
    /// Phase segment 1 is outside the wrapped `RangeInclusive`
    PhaseSeg1OutOfRange(RangeInclusive<u32>),
    /// Phase segment 2 is outside the wrapped `RangeInclusive`
    PhaseSeg2OutOfRange(RangeInclusive<u32>),
}
