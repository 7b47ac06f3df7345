//! Packet framing
//!
//! With variable packet length enabled (PKTCTRL0.LENGTH_CONFIG = 1) and status appending
//! enabled (PKTCTRL1.APPEND_STATUS = 1), a frame in the FIFO looks like:
//!
//! ```text
//! TX FIFO: | length | payload (length bytes) |
//! RX FIFO: | length | payload (length bytes) | RSSI | CRC_OK:1 LQI:7 |
//! ```
//!
//! The two trailing status bytes are appended by the radio, not by this driver.
//! Every FIFO byte is read with a single-byte access, which keeps the framing aligned
//! even when the caller's buffer is shorter than the packet.

use embedded_hal::{digital::OutputPin, spi::SpiBus};

use crate::{
    device::Device,
    error::Error,
    registers::{Strobe, FIFO},
    rssi::decode_rssi,
};

pub use crate::registers::LinkQuality;

/// Largest payload that fits the 64-byte FIFO
pub const MAX_PACKET_LEN: usize = 64;

/// FIFO bytes around the payload of a received frame: length byte, RSSI, LQI
pub(crate) const FRAME_OVERHEAD: usize = 3;

/// Metadata of a delivered packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketInfo {
    /// Bytes copied into the caller's buffer
    pub len: usize,
    /// Length announced by the length byte; larger than `len` when truncated
    pub declared_len: usize,
    /// Signal strength while the packet was received, in dBm
    pub rssi: i16,
    /// Link quality indicator, lower is better
    pub lqi: u8,
}

impl PacketInfo {
    /// The caller's buffer was too small and the tail of the payload was discarded
    pub fn truncated(&self) -> bool {
        self.len < self.declared_len
    }
}

/// Outcome of one receive attempt
///
/// Only [`Reception::Delivered`] carries data. Use [`Reception::bytes_written`] for the
/// collapsed view where every other outcome is simply zero bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reception {
    /// The RX FIFO is empty
    NoData,
    /// The RX FIFO overflowed and was flushed
    Overflow,
    /// The length byte was 0 or larger than the FIFO; the RX FIFO was flushed
    Malformed {
        /// Length byte as read
        declared: u8,
    },
    /// The frame was drained but the hardware CRC check failed
    CrcFailed {
        /// Length byte as read
        declared: u8,
    },
    /// A packet passed the CRC check and was copied into the buffer
    Delivered(PacketInfo),
}

impl Reception {
    /// Number of payload bytes written into the buffer, 0 unless delivered
    pub fn bytes_written(&self) -> usize {
        match self {
            Self::Delivered(info) => info.len,
            _ => 0,
        }
    }

    /// A packet passed the CRC check and was copied into the buffer
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

impl<SPI, CS> Device<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Queues a length-prefixed frame in the TX FIFO.
    ///
    /// The caller must flush the TX FIFO beforehand.
    ///
    /// # Errors
    /// * `Error::PayloadLength` - `payload` is empty or longer than [`MAX_PACKET_LEN`];
    ///   nothing is written
    pub fn write_packet(&mut self, payload: &[u8]) -> Result<(), Error<SPI::Error>> {
        if payload.is_empty() || payload.len() > MAX_PACKET_LEN {
            return Err(Error::PayloadLength(payload.len()));
        }
        self.write_register(FIFO, payload.len() as u8)?;
        self.write_burst(FIFO, payload)
    }

    /// Drains one frame from the RX FIFO into `buf`.
    ///
    /// # Behavior
    /// - Length byte 0 or above 64: the RX FIFO is flushed, [`Reception::Malformed`]
    /// - Payload longer than `buf`: the excess is read and dropped, the delivered
    ///   length is `buf.len()`
    /// - CRC_OK clear in the trailer: [`Reception::CrcFailed`], `buf` may hold
    ///   partial garbage
    ///
    /// The RX FIFO must hold at least the length byte; an empty FIFO reads as
    /// whatever the chip returns on underflow.
    pub fn read_packet(&mut self, buf: &mut [u8]) -> Result<Reception, Error<SPI::Error>> {
        let declared = self.read_register(FIFO)?;
        let declared_len = declared as usize;

        if declared_len == 0 || declared_len > MAX_PACKET_LEN {
            log::debug!("discarding frame with length byte {}", declared);
            self.strobe(Strobe::FlushRx)?;
            return Ok(Reception::Malformed { declared });
        }

        let len = declared_len.min(buf.len());
        for byte in buf[..len].iter_mut() {
            *byte = self.read_register(FIFO)?;
        }
        for _ in len..declared_len {
            self.read_register(FIFO)?;
        }

        let rssi = self.read_register(FIFO)?;
        let quality = LinkQuality::from(self.read_register(FIFO)?);

        if !quality.crc_ok {
            log::debug!("discarding {} byte frame with bad CRC", declared);
            return Ok(Reception::CrcFailed { declared });
        }

        if len < declared_len {
            log::warn!("truncated {} byte packet to {} bytes", declared_len, len);
        }

        Ok(Reception::Delivered(PacketInfo {
            len,
            declared_len,
            rssi: decode_rssi(rssi),
            lqi: quality.lqi,
        }))
    }
}
