//! Register map of the RS-CANFD peripheral and the system blocks it depends on
//!
//! Offsets, field positions and key values in this module are dictated by the
//! hardware and must not be changed.

pub mod can;
pub mod port;
pub mod sysctl;

/// Base address of the RS-CANFD instance 0
pub const RSCFD0_BASE: usize = 0xFFD0_0000;
/// Base address of the RS-CANFD instance 1
pub const RSCFD1_BASE: usize = 0xFFD2_0000;

/// Physical RS-CANFD peripheral instance
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instance {
    /// Instance at [`RSCFD0_BASE`]
    Rscfd0,
    /// Instance at [`RSCFD1_BASE`]
    Rscfd1,
}

impl Instance {
    /// Resolves the instance located at `base`. `None` if there is no CAN
    /// peripheral at that address.
    pub fn from_base(base: usize) -> Option<Self> {
        match base {
            RSCFD0_BASE => Some(Self::Rscfd0),
            RSCFD1_BASE => Some(Self::Rscfd1),
            _ => None,
        }
    }

    /// Base address of the register block
    pub fn base(self) -> usize {
        match self {
            Self::Rscfd0 => RSCFD0_BASE,
            Self::Rscfd1 => RSCFD1_BASE,
        }
    }

    /// Bit of this instance in [`sysctl::MSR_RSCANFD`]
    pub fn module_stop_mask(self) -> u32 {
        match self {
            Self::Rscfd0 => 1 << 0,
            Self::Rscfd1 => 1 << 1,
        }
    }

    /// Port pins carrying the CAN signals of channel 0
    pub fn pins(self) -> port::CanPins {
        match self {
            Self::Rscfd0 => port::CanPins {
                group: 10,
                tx: 0,
                rx: 1,
                function: port::AltFunction::ALT2,
            },
            Self::Rscfd1 => port::CanPins {
                group: 2,
                tx: 5,
                rx: 6,
                function: port::AltFunction::ALT2,
            },
        }
    }
}
