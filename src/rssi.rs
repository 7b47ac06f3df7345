//! Signal strength decoding
//!
//! The RSSI status register and the first appended status byte hold the signal
//! strength as a two's complement number in half-dB steps, offset by 74 dB for the
//! 433 MHz band (datasheet section 17.3).

/// Offset subtracted from the halved raw value
pub const RSSI_OFFSET: i16 = 74;

/// Converts a raw RSSI byte into dBm.
///
/// Division truncates toward zero, so raw values 255 and 254 both decode to -74 dBm,
/// matching the datasheet's integer conversion example.
pub fn decode_rssi(raw: u8) -> i16 {
    let value = if raw >= 128 {
        i16::from(raw) - 256
    } else {
        i16::from(raw)
    };
    value / 2 - RSSI_OFFSET
}
