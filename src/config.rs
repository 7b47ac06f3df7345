//! Driver configuration
//!
//! The CC1101 gives no completion interrupt unless a GDO pin is wired for it, so the
//! driver needs a policy for how long to wait after reset and after starting a
//! transmission. Both waits can be a fixed delay (the conservative default) or a
//! bounded poll of a GDO line.

/// How to wait for the hardware to finish an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitPolicy {
    /// Sleep for a fixed time and assume the operation completed
    FixedDelay {
        /// Delay in milliseconds
        ms: u32,
    },
    /// Poll a GDO line until it reports completion
    ///
    /// - After reset: the secondary line (GDO2 as CHIP_RDYn) must go low
    /// - After TX: the ready line (GDO0 as sync word) must go high, then low at end of packet
    ReadyLine {
        /// Time between two samples of the line
        poll_interval_us: u32,
        /// Give up after this long and report [`Error::Timeout`](crate::Error::Timeout)
        timeout_ms: u32,
    },
}

impl WaitPolicy {
    /// Number of samples a [`WaitPolicy::ReadyLine`] poll takes before timing out
    pub(crate) fn poll_budget(poll_interval_us: u32, timeout_ms: u32) -> u32 {
        (timeout_ms.saturating_mul(1000) / poll_interval_us.max(1)).max(1)
    }
}

/// Driver policies
///
/// # Defaults
/// - 10 ms fixed settle time after SRES
/// - 100 ms fixed delay after STX
/// - Read-back verification of every profile register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Wait after the reset strobe before writing registers
    pub reset_settle: WaitPolicy,
    /// Wait after the TX strobe before returning from `tx`
    pub tx_completion: WaitPolicy,
    /// Read back every profile register after writing it
    pub verify: bool,
}

impl Config {
    /// Fixed delays and no read-back: `configure` can only fail on a bus error
    pub const fn compatible() -> Self {
        Self {
            reset_settle: WaitPolicy::FixedDelay { ms: 10 },
            tx_completion: WaitPolicy::FixedDelay { ms: 100 },
            verify: false,
        }
    }

    /// Replaces the wait after SRES
    pub const fn with_reset_settle(mut self, policy: WaitPolicy) -> Self {
        self.reset_settle = policy;
        self
    }

    /// Replaces the wait after STX
    pub const fn with_tx_completion(mut self, policy: WaitPolicy) -> Self {
        self.tx_completion = policy;
        self
    }

    /// Enables or disables register read-back in [`Transceiver::configure`](crate::Transceiver::configure)
    pub const fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::compatible().with_verify(true)
    }
}
