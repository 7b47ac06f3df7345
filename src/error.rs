//! Driver error type

use core::fmt;

/// CC1101 driver error
///
/// Receive-side conditions (nothing received, malformed length, CRC failure) are not errors;
/// they are reported through [`Reception`](crate::Reception).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SpiE> {
    /// SPI transfer failed
    Bus(SpiE),
    /// Chip-select could not be driven, or the ready/secondary line could not be sampled
    Pin,
    /// A status register returned a value outside its documented encoding
    Deserialization(u8),
    /// The ready line did not reach the expected level within the configured timeout
    Timeout,
    /// A configuration register read back a different value than was written
    Verification {
        /// Register address
        address: u8,
        /// Value from the profile
        expected: u8,
        /// Value read back from the chip
        actual: u8,
    },
    /// Payload does not fit a single FIFO frame (1..=64 bytes)
    PayloadLength(usize),
}

impl<SpiE: fmt::Debug> fmt::Display for Error<SpiE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "SPI error: {:?}", err),
            Self::Pin => write!(f, "GPIO error"),
            Self::Deserialization(raw) => write!(f, "undecodable status value 0x{:02X}", raw),
            Self::Timeout => write!(f, "timed out waiting for ready line"),
            Self::Verification {
                address,
                expected,
                actual,
            } => write!(
                f,
                "register 0x{:02X} read back 0x{:02X}, expected 0x{:02X}",
                address, actual, expected
            ),
            Self::PayloadLength(len) => write!(f, "payload length {} outside 1..=64", len),
        }
    }
}

impl<SpiE: fmt::Debug> core::error::Error for Error<SpiE> {}
