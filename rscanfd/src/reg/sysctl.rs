//! Clock controller and standby controller registers
//!
//! Both blocks are write protected. A protected register only accepts writes
//! between writing [`KEY_UNLOCK`] and [`KEY_LOCK`] to its key register.

/// Key register value enabling writes to the protected registers
pub const KEY_UNLOCK: u32 = 0xA5A5_A501;
/// Key register value disabling writes to the protected registers
pub const KEY_LOCK: u32 = 0xA5A5_A500;

/// Clock controller base address
pub const CLKC_BASE: usize = 0xFF98_0000;
/// Clock controller key register
pub const CLKKCPROT1: usize = CLKC_BASE + 0x0700;
/// CPU clock source selection
pub const CKSC_CPUC: usize = CLKC_BASE + 0x0120;
/// CPU clock source selection status
pub const CKSC_CPUS: usize = CLKC_BASE + 0x0128;
/// PLL output status
pub const CLKD_PLLS: usize = CLKC_BASE + 0x01C8;

/// [`CKSC_CPUC`] value selecting the undivided PLL output
pub const CKSC_CPUC_PLLO: u32 = 0x0000_0000;
/// [`CKSC_CPUS`] flag set while a clock source switch is ongoing
pub const CPUCLKSACT: u32 = 1 << 0;
/// [`CLKD_PLLS`] flag set once the PLL output divider is synchronized
pub const PLLCLKDSYNC: u32 = 1 << 1;

/// Standby controller base address
pub const STBC_BASE: usize = 0xFF98_1000;
/// Standby controller key register
pub const STBCKCPROT: usize = STBC_BASE + 0x0700;
/// Module stop key register
pub const MSRKCPROT: usize = STBC_BASE + 0x0710;
/// Module stop register of the RS-CANFD instances. A set bit keeps the
/// instance stopped; see [`Instance::module_stop_mask`].
///
/// [`Instance::module_stop_mask`]: super::Instance::module_stop_mask
pub const MSR_RSCANFD: usize = STBC_BASE + 0x0040;
