//! Waiting on hardware status flags

use crate::config::PollLimit;

/// Hardware state transitions the driver waits for
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitCondition {
    /// PLL output divider synchronized
    PllSync,
    /// CPU clock source switch finished
    ClockSwitch,
    /// Message RAM initialization finished
    RamInit,
    /// Peripheral entered global reset mode
    GlobalReset,
    /// Channel left stop mode
    ChannelAwake,
    /// Peripheral entered global operating mode
    GlobalOperating,
    /// Channel left reset mode
    ChannelCommunication,
    /// Previous transmission request of the transmit buffer completed
    TransmitIdle,
}

/// A status flag did not reach the expected state within the [`PollLimit`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout(pub WaitCondition);

/// Spins until `ready` returns `true`.
///
/// With [`PollLimit::Attempts`] the closure is evaluated at most that many
/// times before giving up.
pub(crate) fn wait_until(
    limit: PollLimit,
    condition: WaitCondition,
    mut ready: impl FnMut() -> bool,
) -> Result<(), Timeout> {
    match limit {
        PollLimit::Unbounded => {
            while !ready() {}
            Ok(())
        }
        PollLimit::Attempts(attempts) => {
            for _ in 0..attempts {
                if ready() {
                    return Ok(());
                }
            }
            Err(Timeout(condition))
        }
    }
}
