//! Port function registers
//!
//! Every register of the port block is guarded by the `PPCMDn` register of
//! its group: a write is only accepted right after the bitwise complement of
//! the same value has been written to `PPCMDn`. Writes that skip this step
//! are dropped by the hardware without any error indication.

/// Port block base address
pub const PORT_BASE: usize = 0xFFC1_0000;

/// Port mode, set bit makes the pin an input
pub const fn pm(group: usize) -> usize {
    PORT_BASE + 0x0300 + group * 4
}

/// Port mode control, set bit selects the alternate function
pub const fn pmc(group: usize) -> usize {
    PORT_BASE + 0x0400 + group * 4
}

/// Port function control, bit 0 of the alternate function index
pub const fn pfc(group: usize) -> usize {
    PORT_BASE + 0x0500 + group * 4
}

/// Port function control expansion, bit 1 of the alternate function index
pub const fn pfce(group: usize) -> usize {
    PORT_BASE + 0x0600 + group * 4
}

/// Port function control additional expansion, bit 2 of the alternate
/// function index
pub const fn pfcae(group: usize) -> usize {
    PORT_BASE + 0x0A00 + group * 4
}

/// Write protection command register of a group
pub const fn ppcmd(group: usize) -> usize {
    PORT_BASE + 0x0C00 + group * 4
}

/// Alternate pin function, numbered from 1 as in the pin function tables
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AltFunction(u8);

impl AltFunction {
    /// Alternate function 1
    pub const ALT1: Self = Self(1);
    /// Alternate function 2
    pub const ALT2: Self = Self(2);
    /// Alternate function 3
    pub const ALT3: Self = Self(3);
    /// Alternate function 4
    pub const ALT4: Self = Self(4);
    /// Alternate function 5
    pub const ALT5: Self = Self(5);

    /// Index spread over PFC (bit 0), PFCE (bit 1) and PFCAE (bit 2)
    pub fn code(self) -> u8 {
        self.0 - 1
    }
}

/// Pins of a port group carrying the CAN signals
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanPins {
    /// Port group number
    pub group: usize,
    /// Bit of the CAN TX pin within the group
    pub tx: u8,
    /// Bit of the CAN RX pin within the group
    pub rx: u8,
    /// Alternate function routing both pins to the CAN peripheral
    pub function: AltFunction,
}

impl CanPins {
    /// Bit mask of the TX pin
    pub fn tx_mask(&self) -> u32 {
        1 << self.tx
    }

    /// Bit mask of the RX pin
    pub fn rx_mask(&self) -> u32 {
        1 << self.rx
    }

    /// Bit mask of both pins
    pub fn mask(&self) -> u32 {
        self.tx_mask() | self.rx_mask()
    }
}
