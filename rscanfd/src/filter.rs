//! Receive acceptance rules
use crate::reg::can::GaflP0;
use embedded_can::StandardId;

/// Acceptance rule in the peripheral's representation, the four words
/// `GAFLIDj`, `GAFLMj`, `GAFLP0j` and `GAFLP1j`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuleEntry(pub(crate) [u32; 4]);

impl RuleEntry {
    /// Words in register order
    pub fn words(&self) -> [u32; 4] {
        self.0
    }
}

/// Classic filter/mask acceptance rule for 11-bit data frames
///
/// A frame matches when its identifier equals `id` in every bit set in
/// `mask`. Matching frames are stored into the dedicated receive buffer
/// `rx_buffer`. Routing to receive FIFOs is never enabled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcceptanceRule {
    /// ID filter
    pub id: StandardId,
    /// ID mask, set bits are compared
    pub mask: u16,
    /// Minimum data length code. 0 accepts any length; it only takes effect
    /// with the global DLC check enabled.
    pub min_dlc: u8,
    /// Index of the receive buffer matching frames are stored to
    pub rx_buffer: u8,
}

impl AcceptanceRule {
    /// Rule matching every standard data frame, stored into buffer `rx_buffer`
    pub fn accept_all_into_buffer(rx_buffer: u8) -> Self {
        Self {
            id: StandardId::ZERO,
            mask: 0,
            min_dlc: 0,
            rx_buffer,
        }
    }
}

impl From<AcceptanceRule> for RuleEntry {
    fn from(rule: AcceptanceRule) -> Self {
        let mut pointer = GaflP0(0);
        pointer.set_gafldlc(rule.min_dlc);
        pointer.set_gaflrmv(true);
        pointer.set_gaflrmdp(rule.rx_buffer);
        Self([
            rule.id.as_raw().into(),
            u32::from(rule.mask & StandardId::MAX.as_raw()),
            pointer.0,
            0,
        ])
    }
}
