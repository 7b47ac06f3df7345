//! CC1101 Bus Transport and Register Access
//!
//! This module provides the low-level interface to the CC1101 over an exclusively owned
//! SPI bus. Unlike an `SpiDevice`, the bus is driven together with a dedicated chip-select
//! pin so every transaction is bracketed exactly once:
//!
//! 1. Chip-select is driven low
//! 2. The header byte and data bytes are transferred
//! 3. The bus is flushed
//! 4. Chip-select is driven high, even if a transfer failed
//!
//! Five primitives make up the whole vocabulary of the driver:
//! - [`Device::strobe`]: one command byte
//! - [`Device::read_register`]: header `addr | 0x80`, one data byte
//! - [`Device::read_status`]: header `addr | 0xC0`, one data byte
//! - [`Device::write_register`]: header `addr`, one data byte
//! - [`Device::write_burst`]: header `addr | 0x40`, any number of data bytes
//!
//! # Example
//! ```no_run
//! # fn demo<SPI: embedded_hal::spi::SpiBus, CS: embedded_hal::digital::OutputPin>(spi: SPI, cs: CS)
//! # -> Result<(), cc1101_radio::Error<SPI::Error>> {
//! use cc1101_radio::{ConfigRegister, Device, MarcState, Strobe};
//!
//! let mut device = Device::new(spi, cs)?;
//!
//! device.strobe(Strobe::Idle)?;
//! device.write_register(ConfigRegister::Channr, 0x05)?;
//! let state: MarcState = device.read_status_register()?;
//! # Ok(())
//! # }
//! ```

use embedded_hal::{digital::OutputPin, spi::SpiBus};
use regiface::{FromByteArray, ReadableRegister};

use crate::{
    error::Error,
    registers::{Strobe, ADDRESS_MASK, BURST, READ},
};

/// Register-level interface to the CC1101.
///
/// Owns the SPI bus and the chip-select line. Only one transaction can be in flight
/// because every primitive takes `&mut self` and completes before returning.
pub struct Device<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> Device<SPI, CS> {
    /// Releases the underlying SPI bus and chip-select pin.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Device<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Creates a new Device and deasserts chip-select.
    ///
    /// # Errors
    /// * `Error::Pin` - chip-select could not be driven high
    pub fn new(spi: SPI, mut cs: CS) -> Result<Self, Error<SPI::Error>> {
        cs.set_high().map_err(|_| Error::Pin)?;
        Ok(Self { spi, cs })
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T, Error<SPI::Error>>
    where
        F: FnOnce(&mut SPI) -> Result<T, SPI::Error>,
    {
        self.cs.set_low().map_err(|_| Error::Pin)?;

        let result = f(&mut self.spi).and_then(|value| self.spi.flush().map(|()| value));
        let released = self.cs.set_high();

        let value = result.map_err(Error::Bus)?;
        released.map_err(|_| Error::Pin)?;
        Ok(value)
    }

    /// Issues a command strobe.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    /// * `Error::Pin` - chip-select could not be driven
    pub fn strobe(&mut self, strobe: Strobe) -> Result<(), Error<SPI::Error>> {
        self.transaction(|spi| spi.write(&[strobe.opcode()]))
    }

    /// Reads a single configuration register, or one byte of the RX FIFO.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    /// * `Error::Pin` - chip-select could not be driven
    pub fn read_register<A>(&mut self, address: A) -> Result<u8, Error<SPI::Error>>
    where
        A: Into<u8>,
    {
        let mut buffer = [(address.into() & ADDRESS_MASK) | READ, 0x00];
        self.transaction(|spi| spi.transfer_in_place(&mut buffer))?;
        Ok(buffer[1])
    }

    /// Reads a status register (0x30-0x3D).
    ///
    /// Status registers share their addresses with the strobes and are only
    /// reachable with the burst bit set alongside the read bit.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    /// * `Error::Pin` - chip-select could not be driven
    pub fn read_status<A>(&mut self, address: A) -> Result<u8, Error<SPI::Error>>
    where
        A: Into<u8>,
    {
        let mut buffer = [(address.into() & ADDRESS_MASK) | READ | BURST, 0x00];
        self.transaction(|spi| spi.transfer_in_place(&mut buffer))?;
        Ok(buffer[1])
    }

    /// Writes a single configuration register, or one byte of the TX FIFO.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    /// * `Error::Pin` - chip-select could not be driven
    pub fn write_register<A>(&mut self, address: A, value: u8) -> Result<(), Error<SPI::Error>>
    where
        A: Into<u8>,
    {
        let header = address.into() & ADDRESS_MASK;
        self.transaction(|spi| spi.write(&[header, value]))
    }

    /// Writes consecutive bytes starting at `address`.
    ///
    /// For the FIFO and PATABLE the address does not advance; every byte goes to
    /// the same queue.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    /// * `Error::Pin` - chip-select could not be driven
    pub fn write_burst<A>(&mut self, address: A, bytes: &[u8]) -> Result<(), Error<SPI::Error>>
    where
        A: Into<u8>,
    {
        let header = (address.into() & ADDRESS_MASK) | BURST;
        self.transaction(|spi| {
            spi.write(&[header])?;
            spi.write(bytes)
        })
    }

    /// Reads and decodes a typed status register.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing ReadableRegister with u8 ID
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    /// * `Error::Pin` - chip-select could not be driven
    /// * `Error::Deserialization` - the raw value is outside the register's encoding
    pub fn read_status_register<R>(&mut self) -> Result<R, Error<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8> + FromByteArray<Array = [u8; 1]>,
    {
        let raw = self.read_status(R::id())?;
        R::from_bytes([raw]).map_err(|_| Error::Deserialization(raw))
    }
}
