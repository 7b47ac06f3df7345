//! Command strobes
//!
//! A strobe is a single header byte in the 0x30-0x3D range sent without data.
//! It triggers an internal state transition of the radio control state machine.

/// Command strobe opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Strobe {
    /// SRES: reset chip
    Reset = 0x30,
    /// SFSTXON: enable and calibrate the frequency synthesizer
    FsTxOn = 0x31,
    /// SXOFF: turn off the crystal oscillator
    XtalOff = 0x32,
    /// SCAL: calibrate the frequency synthesizer and turn it off
    Calibrate = 0x33,
    /// SRX: enable RX
    Rx = 0x34,
    /// STX: enable TX (from IDLE, calibrates first if MCSM0.FS_AUTOCAL = 1)
    Tx = 0x35,
    /// SIDLE: exit RX/TX, turn off the frequency synthesizer
    Idle = 0x36,
    /// SWOR: start automatic RX polling (wake-on-radio)
    WakeOnRadio = 0x38,
    /// SPWD: enter power down when CSn goes high
    PowerDown = 0x39,
    /// SFRX: flush the RX FIFO (only valid in IDLE or RXFIFO_OVERFLOW)
    FlushRx = 0x3A,
    /// SFTX: flush the TX FIFO (only valid in IDLE or TXFIFO_UNDERFLOW)
    FlushTx = 0x3B,
    /// SWORRST: reset the real time clock to Event1
    WorReset = 0x3C,
    /// SNOP: no operation, returns the chip status byte
    Nop = 0x3D,
}

impl Strobe {
    /// Header byte sent on the bus
    pub const fn opcode(self) -> u8 {
        self as u8
    }
}

impl From<Strobe> for u8 {
    fn from(strobe: Strobe) -> Self {
        strobe.opcode()
    }
}
