//! Register definitions for the CC1101 radio
//! Generated from the CC1101 datasheet (SWRS061I), section 29
//!
//! The SPI header byte is laid out as:
//! - Bit 7: R/W (1 = read)
//! - Bit 6: burst (1 = burst access, also selects status registers at 0x30-0x3D)
//! - Bits 5:0: register index

mod config;
mod status;
mod strobe;

pub use config::*;
pub use status::*;
pub use strobe::*;

/// Read bit of the header byte
pub const READ: u8 = 0x80;

/// Burst bit of the header byte
pub const BURST: u8 = 0x40;

/// Bits of the header byte carrying the register index
pub const ADDRESS_MASK: u8 = 0x3F;

/// Power amplifier ramp table (8 bytes, burst access)
pub const PATABLE: u8 = 0x3E;

/// TX FIFO on write, RX FIFO on read
pub const FIFO: u8 = 0x3F;

/// Number of entries in the PA table
pub const PATABLE_LEN: usize = 8;
