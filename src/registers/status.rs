//! Status registers
//!
//! This module contains the read-only status registers (0x30-0x3D). They share their
//! addresses with the command strobes, so they must be read with both the read and
//! burst bits set (header byte 0xF0-0xFD).
//!
//! Typed registers are provided for the values the driver decodes:
//! - Part number and version (chip identification)
//! - Link quality and RSSI of the last packet / current channel
//! - Main radio control state machine state
//! - FIFO byte counts with overflow/underflow flags

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister};

use crate::rssi::decode_rssi;

/// Status register addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusRegister {
    /// Part number
    Partnum = 0x30,
    /// Current version number
    Version = 0x31,
    /// Frequency offset estimate
    Freqest = 0x32,
    /// Demodulator estimate for link quality
    Lqi = 0x33,
    /// Received signal strength indication
    Rssi = 0x34,
    /// Control state machine state
    Marcstate = 0x35,
    /// High byte of WOR timer
    Wortime1 = 0x36,
    /// Low byte of WOR timer
    Wortime0 = 0x37,
    /// Current GDOx status and packet status
    Pktstatus = 0x38,
    /// Current setting from PLL calibration module
    VcoVcDac = 0x39,
    /// Underflow and number of bytes in the TX FIFO
    Txbytes = 0x3A,
    /// Overflow and number of bytes in the RX FIFO
    Rxbytes = 0x3B,
    /// Last RC oscillator calibration result
    Rcctrl1Status = 0x3C,
    /// Last RC oscillator calibration result
    Rcctrl0Status = 0x3D,
}

impl StatusRegister {
    /// Register index (bits 5:0 of the header byte)
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

impl From<StatusRegister> for u8 {
    fn from(register: StatusRegister) -> Self {
        register.addr()
    }
}

/// Part number register (address: 0x30)
///
/// Reads 0x00 on every CC1101 revision.
#[register(0x30u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct PartNumber {
    /// Chip part number
    pub value: u8,
}

/// Version register (address: 0x31)
///
/// Reads 0x14 on current silicon, 0x04 on early revisions.
#[register(0x31u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct ChipVersion {
    /// Chip version number
    pub value: u8,
}

/// Link quality (address: 0x33)
///
/// The same encoding is used by the second status byte appended to every received packet.
///
/// # Format
/// - Bit 7: CRC_OK, set when the CRC of the last packet matched
/// - Bits 6:0: link quality estimate, lower is better
#[register(0x33u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkQuality {
    /// Hardware CRC check passed
    pub crc_ok: bool,
    /// Link quality indicator
    pub lqi: u8,
}

impl From<u8> for LinkQuality {
    fn from(raw: u8) -> Self {
        Self {
            crc_ok: raw & 0x80 != 0,
            lqi: raw & 0x7F,
        }
    }
}

/// Received signal strength (address: 0x34)
///
/// Two's complement value in 0.5 dB steps with a fixed 74 dB offset.
/// Use [`RssiStatus::dbm`] to convert.
#[register(0x34u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct RssiStatus {
    /// Raw RSSI byte
    pub raw: u8,
}

impl RssiStatus {
    /// Signal strength in dBm
    pub fn dbm(&self) -> i16 {
        decode_rssi(self.raw)
    }
}

/// Error type for invalid machine state values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidMachineState(pub u8);

/// Main radio control state machine state
///
/// Extracted from MARCSTATE bits 4:0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MachineState {
    /// SLEEP
    Sleep = 0x00,
    /// IDLE
    Idle = 0x01,
    /// Crystal oscillator off
    XOff = 0x02,
    /// VCO on, manual calibration
    VcoOnMc = 0x03,
    /// Regulator on, manual calibration
    RegOnMc = 0x04,
    /// Manual calibration running
    ManualCalibration = 0x05,
    /// VCO on
    VcoOn = 0x06,
    /// Regulator on
    RegOn = 0x07,
    /// Calibration starting
    StartCalibration = 0x08,
    /// Bandwidth boost during calibration
    BandwidthBoost = 0x09,
    /// Synthesizer locked
    FsLock = 0x0A,
    /// IF ADC on
    IfAdcOn = 0x0B,
    /// Calibration finished
    EndCalibration = 0x0C,
    /// Receiving
    Rx = 0x0D,
    /// RX finished, taking the RXOFF_MODE transition
    RxEnd = 0x0E,
    /// RX reset after the packet ends
    RxRst = 0x0F,
    /// Switching from TX to RX
    TxRxSwitch = 0x10,
    /// RX FIFO overflowed, waiting for SFRX
    RxFifoOverflow = 0x11,
    /// Synthesizer on, ready for fast TX
    FsTxOn = 0x12,
    /// Transmitting
    Tx = 0x13,
    /// TX finished, taking the TXOFF_MODE transition
    TxEnd = 0x14,
    /// Switching from RX to TX
    RxTxSwitch = 0x15,
    /// TX FIFO underflowed, waiting for SFTX
    TxFifoUnderflow = 0x16,
}

impl TryFrom<u8> for MachineState {
    type Error = InvalidMachineState;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x00 => Self::Sleep,
            0x01 => Self::Idle,
            0x02 => Self::XOff,
            0x03 => Self::VcoOnMc,
            0x04 => Self::RegOnMc,
            0x05 => Self::ManualCalibration,
            0x06 => Self::VcoOn,
            0x07 => Self::RegOn,
            0x08 => Self::StartCalibration,
            0x09 => Self::BandwidthBoost,
            0x0A => Self::FsLock,
            0x0B => Self::IfAdcOn,
            0x0C => Self::EndCalibration,
            0x0D => Self::Rx,
            0x0E => Self::RxEnd,
            0x0F => Self::RxRst,
            0x10 => Self::TxRxSwitch,
            0x11 => Self::RxFifoOverflow,
            0x12 => Self::FsTxOn,
            0x13 => Self::Tx,
            0x14 => Self::TxEnd,
            0x15 => Self::RxTxSwitch,
            0x16 => Self::TxFifoUnderflow,
            invalid => return Err(InvalidMachineState(invalid)),
        })
    }
}

/// Radio control state register (address: 0x35)
#[register(0x35u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct MarcState {
    /// Current state of the control state machine
    pub state: MachineState,
}

/// TX FIFO status (address: 0x3A)
#[register(0x3Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct TxBytes {
    /// TX FIFO has underflowed, flush with SFTX
    pub underflow: bool,
    /// Number of bytes in the TX FIFO
    pub count: u8,
}

/// RX FIFO status (address: 0x3B)
///
/// # Important Notes
/// - The count may be read while it is being updated; the datasheet errata
///   recommends reading until two consecutive values agree when draining on the fly
/// - After an overflow the chip stays in RXFIFO_OVERFLOW until SFRX
#[register(0x3Bu8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct RxBytes {
    /// RX FIFO has overflowed, flush with SFRX
    pub overflow: bool,
    /// Number of bytes in the RX FIFO
    pub count: u8,
}

impl FromByteArray for PartNumber {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl FromByteArray for ChipVersion {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl FromByteArray for LinkQuality {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from(bytes[0]))
    }
}

impl FromByteArray for RssiStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { raw: bytes[0] })
    }
}

impl FromByteArray for MarcState {
    type Error = InvalidMachineState;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            state: MachineState::try_from(bytes[0] & 0x1F)?,
        })
    }
}

impl FromByteArray for TxBytes {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            underflow: bytes[0] & 0x80 != 0,
            count: bytes[0] & 0x7F,
        })
    }
}

impl FromByteArray for RxBytes {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            overflow: bytes[0] & 0x80 != 0,
            count: bytes[0] & 0x7F,
        })
    }
}
