//! RS-CANFD register block
//!
//! All offsets are relative to the instance base address. Only channel 0,
//! transmit buffer 0, receive buffer 0 and acceptance rule page 0 are laid out
//! here; those are the resources the driver uses.

use bitfield::bitfield;

/// Channel 0 nominal bit rate configuration
pub const C0NCFG: usize = 0x0000;
/// Channel 0 control
pub const C0CTR: usize = 0x0004;
/// Channel 0 status
pub const C0STS: usize = 0x0008;
/// Channel 0 error flags
pub const C0ERFL: usize = 0x000C;

/// Global configuration
pub const GCFG: usize = 0x0084;
/// Global control
pub const GCTR: usize = 0x0088;
/// Global status
pub const GSTS: usize = 0x008C;
/// Acceptance filter list entry control
pub const GAFLECTR: usize = 0x0098;
/// Acceptance filter list configuration, rule count of channel 0
pub const GAFLCFG0: usize = 0x009C;
/// Receive buffer number configuration
pub const RMNB: usize = 0x00AC;
/// Receive buffer new data flags of buffers 0 to 31
pub const RMND0: usize = 0x00B0;

/// Transmit buffer 0 control, 8-bit
pub const TMC0: usize = 0x0250;
/// Transmit buffer 0 status, 8-bit
pub const TMSTS0: usize = 0x02D0;

/// Start of the acceptance filter rule window of the selected page
pub const GAFL_BASE: usize = 0x1000;
/// Size of one acceptance filter rule
pub const GAFL_STRIDE: usize = 0x10;

/// Receive buffer 0 identifier
pub const RMID0: usize = 0x2000;
/// Receive buffer 0 pointer (data length code and timestamp)
pub const RMPTR0: usize = 0x2004;
/// Receive buffer 0 FD status
pub const RMFDSTS0: usize = 0x2008;
/// Receive buffer 0 data field, byte accessible
pub const RMDF0: usize = 0x200C;

/// Transmit buffer 0 identifier
pub const TMID0: usize = 0x4000;
/// Transmit buffer 0 pointer (data length code)
pub const TMPTR0: usize = 0x4004;
/// Transmit buffer 0 FD control
pub const TMFDCTR0: usize = 0x4008;
/// Transmit buffer 0 data field, byte accessible
pub const TMDF0: usize = 0x400C;

/// Mask of a standard (11-bit) identifier inside an ID register
pub const STANDARD_ID_MASK: u32 = 0x7FF;

/// Low nibble of [`GSTS`] holding all mode status flags
pub const GSTS_MODE_MASK: u32 = 0xF;

/// Receive buffer 0 flag in [`RMND0`]
pub const RMND_BUFFER_0: u32 = 1 << 0;

/// Payload size code of [`Rmnb::rmpls`] for 64 byte buffers
pub const RMPLS_64_BYTES: u8 = 7;

/// Operating modes of a channel, [`Ctr::chmdc`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelMode {
    /// Channel communication mode
    Communication = 0b00,
    /// Channel reset mode
    Reset = 0b01,
    /// Channel halt mode
    Halt = 0b10,
}

/// Operating modes of the whole peripheral, [`Gctr::gmdc`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GlobalMode {
    /// Global operating mode
    Operating = 0b00,
    /// Global reset mode
    Reset = 0b01,
    /// Global halt mode
    Halt = 0b10,
}

bitfield! {
    /// Nominal bit rate configuration register
    #[derive(Copy, Clone, Default, PartialEq, Eq)]
    pub struct Ncfg(u32);
    impl Debug;

    /// Prescaler, divisor minus one
    pub u16, nbrp, set_nbrp: 9, 0;
    /// Resynchronization jump width
    pub u8, nsjw, set_nsjw: 16, 10;
    /// Time segment 1
    pub u8, ntseg1, set_ntseg1: 24, 17;
    /// Time segment 2
    pub u8, ntseg2, set_ntseg2: 31, 25;
}

bitfield! {
    /// Channel control register
    #[derive(Copy, Clone, Default)]
    pub struct Ctr(u32);

    /// Channel mode select
    pub u8, chmdc, set_chmdc: 1, 0;
    /// Channel stop (sleep) request
    pub cslpr, set_cslpr: 2;
}

bitfield! {
    /// Channel status register
    #[derive(Copy, Clone, Default)]
    pub struct Sts(u32);

    /// Channel is in reset mode
    pub crststs, _: 0;
    /// Channel is in halt mode
    pub chltsts, _: 1;
    /// Channel is in stop mode
    pub cslpsts, _: 2;
    /// Channel is ready to communicate
    pub comsts, _: 7;
}

bitfield! {
    /// Global configuration register
    #[derive(Copy, Clone, Default)]
    pub struct Gcfg(u32);

    /// Transmit priority selection
    pub tpri, set_tpri: 0;
    /// DLC check enable
    pub dce, set_dce: 1;
    /// DLC replacement enable
    pub dre, set_dre: 2;
    /// Mirror mode enable
    pub mme, set_mme: 3;
}

bitfield! {
    /// Global control register
    #[derive(Copy, Clone, Default)]
    pub struct Gctr(u32);

    /// Global mode select
    pub u8, gmdc, set_gmdc: 1, 0;
    /// Global stop (sleep) request
    pub gslpr, set_gslpr: 2;
}

bitfield! {
    /// Global status register
    #[derive(Copy, Clone, Default)]
    pub struct Gsts(u32);

    /// Peripheral is in global reset mode
    pub grststs, _: 0;
    /// Peripheral is in global halt mode
    pub ghltsts, _: 1;
    /// Peripheral is in global stop mode
    pub gslpsts, _: 2;
    /// Message RAM initialization is ongoing
    pub graminit, _: 3;
}

bitfield! {
    /// Acceptance filter list entry control register
    #[derive(Copy, Clone, Default)]
    pub struct Gaflectr(u32);

    /// Rule table page visible in the rule window
    pub u8, aflpn, set_aflpn: 4, 0;
    /// Rule table write enable
    pub afldae, set_afldae: 8;
}

bitfield! {
    /// Acceptance filter list configuration register 0
    #[derive(Copy, Clone, Default)]
    pub struct Gaflcfg0(u32);

    /// Number of rules of channel 0
    pub u8, rnc0, set_rnc0: 31, 24;
}

bitfield! {
    /// Receive buffer number configuration register
    #[derive(Copy, Clone, Default)]
    pub struct Rmnb(u32);

    /// Number of receive buffers
    pub u8, nrxmb, set_nrxmb: 7, 0;
    /// Receive buffer payload storage size
    pub u8, rmpls, set_rmpls: 10, 8;
}

bitfield! {
    /// Buffer identifier register, shared layout of `TMIDn` and `RMIDn`
    #[derive(Copy, Clone, Default)]
    pub struct Id(u32);

    /// Identifier; a standard identifier occupies the low 11 bits
    pub u32, id, set_id: 28, 0;
    /// Transmit history data store enable (transmit buffers only)
    pub thlen, set_thlen: 29;
    /// Remote frame
    pub rtr, set_rtr: 30;
    /// Extended identifier
    pub ide, set_ide: 31;
}

bitfield! {
    /// Buffer pointer register, shared layout of `TMPTRn` and `RMPTRn`
    #[derive(Copy, Clone, Default)]
    pub struct Ptr(u32);

    /// Timestamp (receive buffers only)
    pub u16, ts, _: 15, 0;
    /// Data length code
    pub u8, dlc, set_dlc: 31, 28;
}

bitfield! {
    /// Transmit buffer FD control register
    #[derive(Copy, Clone, Default)]
    pub struct Fdctr(u32);

    /// Error state indicator
    pub esi, set_esi: 0;
    /// Bit rate switch
    pub brs, set_brs: 1;
    /// FD frame format
    pub fdf, set_fdf: 2;
}

bitfield! {
    /// Transmit buffer control register
    #[derive(Copy, Clone, Default)]
    pub struct Tmc(u8);

    /// Transmission request
    pub tmtr, set_tmtr: 0;
    /// Transmission abort request
    pub tmtar, set_tmtar: 1;
    /// One-shot transmission enable
    pub tmom, set_tmom: 2;
}

bitfield! {
    /// Transmit buffer status register
    #[derive(Copy, Clone, Default)]
    pub struct Tmsts(u8);

    /// Transmission in progress
    pub tmtsts, _: 0;
    /// Transmission result
    pub u8, tmtrf, set_tmtrf: 2, 1;
    /// Mirror of the transmission request; set while a request is pending
    pub tmtrm, _: 3;
    /// Mirror of the abort request
    pub tmtarm, _: 4;
}

bitfield! {
    /// Word 2 of an acceptance filter rule
    #[derive(Copy, Clone, Default)]
    pub struct GaflP0(u32);

    /// Minimum data length code, 0 disables the check for this rule
    pub u8, gafldlc, set_gafldlc: 3, 0;
    /// Receive buffer index
    pub u8, gaflrmdp, set_gaflrmdp: 14, 8;
    /// Store to receive buffer
    pub gaflrmv, set_gaflrmv: 15;
    /// Receive rule label
    pub u16, gaflptr, set_gaflptr: 31, 16;
}

/// Offset of word `word` of acceptance rule `rule` in the rule window
pub const fn gafl(rule: usize, word: usize) -> usize {
    GAFL_BASE + rule * GAFL_STRIDE + word * 4
}
