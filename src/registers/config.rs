//! Configuration registers
//!
//! This module contains the addresses of the 47 read/write configuration registers
//! (0x00-0x2E) and the field encodings used by the bundled profiles:
//! - GDO pin signal selection
//! - Packet automation control flags
//!
//! Configuration registers are written once after reset, while the chip is in IDLE.
//! Their contents are retained in all states except SLEEP.

use bitflags::bitflags;

/// Configuration register addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ConfigRegister {
    /// GDO2 output pin configuration
    Iocfg2 = 0x00,
    /// GDO1 output pin configuration
    Iocfg1 = 0x01,
    /// GDO0 output pin configuration
    Iocfg0 = 0x02,
    /// RX FIFO and TX FIFO thresholds
    Fifothr = 0x03,
    /// Sync word, high byte
    Sync1 = 0x04,
    /// Sync word, low byte
    Sync0 = 0x05,
    /// Packet length
    Pktlen = 0x06,
    /// Packet automation control
    Pktctrl1 = 0x07,
    /// Packet automation control
    Pktctrl0 = 0x08,
    /// Device address
    Addr = 0x09,
    /// Channel number
    Channr = 0x0A,
    /// Frequency synthesizer control
    Fsctrl1 = 0x0B,
    /// Frequency synthesizer control
    Fsctrl0 = 0x0C,
    /// Frequency control word, high byte
    Freq2 = 0x0D,
    /// Frequency control word, middle byte
    Freq1 = 0x0E,
    /// Frequency control word, low byte
    Freq0 = 0x0F,
    /// Modem configuration
    Mdmcfg4 = 0x10,
    /// Modem configuration
    Mdmcfg3 = 0x11,
    /// Modem configuration
    Mdmcfg2 = 0x12,
    /// Modem configuration
    Mdmcfg1 = 0x13,
    /// Modem configuration
    Mdmcfg0 = 0x14,
    /// Modem deviation setting
    Deviatn = 0x15,
    /// Main radio control state machine configuration
    Mcsm2 = 0x16,
    /// Main radio control state machine configuration
    Mcsm1 = 0x17,
    /// Main radio control state machine configuration
    Mcsm0 = 0x18,
    /// Frequency offset compensation configuration
    Foccfg = 0x19,
    /// Bit synchronization configuration
    Bscfg = 0x1A,
    /// AGC control
    Agcctrl2 = 0x1B,
    /// AGC control
    Agcctrl1 = 0x1C,
    /// AGC control
    Agcctrl0 = 0x1D,
    /// High byte Event0 timeout
    Worevt1 = 0x1E,
    /// Low byte Event0 timeout
    Worevt0 = 0x1F,
    /// Wake on radio control
    Worctrl = 0x20,
    /// Front end RX configuration
    Frend1 = 0x21,
    /// Front end TX configuration
    Frend0 = 0x22,
    /// Frequency synthesizer calibration
    Fscal3 = 0x23,
    /// Frequency synthesizer calibration
    Fscal2 = 0x24,
    /// Frequency synthesizer calibration
    Fscal1 = 0x25,
    /// Frequency synthesizer calibration
    Fscal0 = 0x26,
    /// RC oscillator configuration
    Rcctrl1 = 0x27,
    /// RC oscillator configuration
    Rcctrl0 = 0x28,
    /// Frequency synthesizer calibration control
    Fstest = 0x29,
    /// Production test
    Ptest = 0x2A,
    /// AGC test
    Agctest = 0x2B,
    /// Various test settings
    Test2 = 0x2C,
    /// Various test settings
    Test1 = 0x2D,
    /// Various test settings
    Test0 = 0x2E,
}

impl ConfigRegister {
    /// Register index (bits 5:0 of the header byte)
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

impl From<ConfigRegister> for u8 {
    fn from(register: ConfigRegister) -> Self {
        register.addr()
    }
}

/// Signal selection for the IOCFGx registers (bits 5:0)
///
/// Only the signals used by this crate are listed; see table 41 of the datasheet
/// for the full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GdoSignal {
    /// Asserts when the RX FIFO is filled at or above the threshold
    RxFifoThreshold = 0x00,
    /// Asserts at the threshold or at the end of packet
    RxFifoThresholdOrEnd = 0x01,
    /// Asserts when the TX FIFO is filled at or above the threshold
    TxFifoThreshold = 0x02,
    /// Asserts when the TX FIFO is full
    TxFifoFull = 0x03,
    /// Asserts when the RX FIFO has overflowed
    RxFifoOverflow = 0x04,
    /// Asserts when the TX FIFO has underflowed
    TxFifoUnderflow = 0x05,
    /// Asserts when sync word has been sent/received, de-asserts at the end of the packet
    SyncWord = 0x06,
    /// Asserts when a packet has been received with CRC OK
    PacketCrcOk = 0x07,
    /// Carrier sense
    CarrierSense = 0x0E,
    /// CHIP_RDYn, low once the crystal is running and the chip accepts commands
    ChipReadyN = 0x29,
    /// High impedance (3-state)
    HighImpedance = 0x2E,
}

impl GdoSignal {
    /// IOCFGx register value for this signal, active high
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// PKTCTRL1 packet automation control
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Pktctrl1: u8 {
        /// Flush the RX FIFO automatically when the CRC is not OK
        const CRC_AUTOFLUSH = 1 << 3;
        /// Append two status bytes (RSSI, LQI + CRC_OK) to the payload
        const APPEND_STATUS = 1 << 2;
        /// Address check, ADR_CHK bit 1
        const ADDRESS_CHECK_BROADCAST = 1 << 1;
        /// Address check, ADR_CHK bit 0
        const ADDRESS_CHECK = 1;
    }
}

bitflags! {
    /// PKTCTRL0 packet automation control
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Pktctrl0: u8 {
        /// Data whitening on
        const WHITE_DATA = 1 << 6;
        /// CRC calculation in TX and CRC check in RX
        const CRC_EN = 1 << 2;
        /// Infinite packet length mode
        const INFINITE_LENGTH = 1 << 1;
        /// Variable packet length mode, length given by the first byte after sync
        const VARIABLE_LENGTH = 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Pktctrl1 {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Pktctrl1({=u8:#010b})", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Pktctrl0 {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Pktctrl0({=u8:#010b})", self.bits())
    }
}
