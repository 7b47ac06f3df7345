#![no_std]
//! CC1101 Radio Driver
//!
//! This crate provides a type-safe interface for the Texas Instruments CC1101 sub-GHz
//! transceiver. The CC1101 is a low-cost narrowband radio for the 315/433/868/915 MHz ISM
//! bands, accessed over SPI with a small register file, a 64-byte TX FIFO and a 64-byte RX FIFO.
//!
//! # Features
//! - Frequency bands: 300-348 MHz, 387-464 MHz, 779-928 MHz
//! - Modulation support: 2-FSK, GFSK, 4-FSK, ASK/OOK, MSK
//! - Data rate: 0.6 to 600 kbps
//! - Variable-length packets with hardware CRC and appended RSSI/LQI status
//! - Programmable GDO pins for sync, FIFO and chip-ready signalling
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Bus transport and register access
//!   - Owns the SPI bus and drives chip-select around every transaction
//!   - Provides the strobe, single, burst and status access primitives
//!
//! - [`registers`]: Register address space
//!   - [`registers::ConfigRegister`]: configuration registers 0x00-0x2E
//!   - [`registers::StatusRegister`]: read-only status registers
//!   - [`registers::Strobe`]: command strobes
//!
//! - [`profile`]: Complete register profiles applied after reset
//! - [`packet`]: Length-prefixed FIFO framing and receive outcomes
//! - [`rssi`]: Signal strength decoding
//! - [`config`]: Driver policies (settle/completion waiting, verification)
//! - [`transceiver`]: Device lifecycle (configure, RX, TX, read)
//! - [`terminal`]: Console/touch collaborator interfaces and one poll-loop step
//!
//! # Usage
//! Operation follows a fixed sequence:
//!
//! 1. Create a [`Transceiver`] with the SPI bus, chip-select pin, ready line (GDO0) and a delay
//! 2. Call [`Transceiver::configure`] with a [`Profile`]
//! 3. Call [`Transceiver::rx`] to start listening
//! 4. Poll [`Transceiver::data_ready`] and drain packets with [`Transceiver::read`]
//!    or [`Transceiver::receive`]
//! 5. Re-arm with [`Transceiver::rx`] after each packet
//!
//! # Important Notes
//! - The driver is strictly polled; a missed ready-line assertion is not recovered
//! - The bus is exclusively owned, wrap it yourself if it must be shared across tasks
//! - Payloads are limited to 64 bytes (one FIFO)
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}, spi::SpiBus};
//! use cc1101_radio::{Config, Error, Profile, Transceiver};
//!
//! fn start_radio<SPI, CS, RDY, DLY>(
//!     spi: SPI,
//!     cs: CS,
//!     gdo0: RDY,
//!     delay: DLY,
//! ) -> Result<Transceiver<SPI, CS, RDY, DLY>, Error<SPI::Error>>
//! where
//!     SPI: SpiBus,
//!     CS: OutputPin,
//!     RDY: InputPin,
//!     DLY: DelayNs,
//! {
//!     let mut radio = Transceiver::new(spi, cs, gdo0, delay, Config::default())?;
//!     radio.configure(&Profile::REFERENCE_433_92_GFSK_1K2)?;
//!     radio.rx()?;
//!     Ok(radio)
//! }
//! ```

#[cfg(test)]
extern crate std;

pub mod config;
pub mod device;
pub mod error;
pub mod packet;
pub mod profile;
pub mod registers;
pub mod rssi;
pub mod terminal;
pub mod transceiver;

pub use config::{Config, WaitPolicy};
pub use device::Device;
pub use error::Error;
pub use packet::{PacketInfo, Reception, MAX_PACKET_LEN};
pub use profile::{Profile, RegisterSetting};
pub use registers::*;
pub use rssi::decode_rssi;
pub use terminal::{Calibration, Console, Level, Terminal, TickReport, TouchPoint, TouchSampler};
pub use transceiver::{NoPin, PacketRadio, State, Transceiver};
