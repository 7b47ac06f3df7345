//! Register profiles
//!
//! A profile is the complete set of configuration register values for one
//! frequency/modulation/power combination, usually exported from SmartRF Studio.
//! Profiles are plain immutable values handed to
//! [`Transceiver::configure`](crate::Transceiver::configure), so alternate bands or data
//! rates can be supplied without touching the driver.

use crate::registers::{ConfigRegister, GdoSignal, Pktctrl0, Pktctrl1, PATABLE_LEN};

/// One register write of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterSetting {
    pub register: ConfigRegister,
    /// Byte written to `register`
    pub value: u8,
}

impl RegisterSetting {
    pub const fn new(register: ConfigRegister, value: u8) -> Self {
        Self { register, value }
    }
}

/// Ordered register table plus PA ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Profile {
    name: &'static str,
    registers: &'static [RegisterSetting],
    patable: [u8; PATABLE_LEN],
}

impl Profile {
    /// Creates a profile. Registers are written in the given order.
    pub const fn new(
        name: &'static str,
        registers: &'static [RegisterSetting],
        patable: [u8; PATABLE_LEN],
    ) -> Self {
        Self {
            name,
            registers,
            patable,
        }
    }

    /// Human-readable label, shown by the terminal once configured
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Settings in write order
    pub const fn registers(&self) -> &'static [RegisterSetting] {
        self.registers
    }

    /// PA power ramp, written as one PATABLE burst
    pub const fn patable(&self) -> &[u8; PATABLE_LEN] {
        &self.patable
    }

    /// 433.92 MHz, GFSK, 1.2 kbps, variable length with CRC and appended status, +10 dBm
    ///
    /// - GDO2: CHIP_RDYn
    /// - GDO0: asserted between sync word and end of packet
    pub const REFERENCE_433_92_GFSK_1K2: Profile = Profile::new(
        "433.92MHz GFSK 1.2kbps",
        &REFERENCE_433_92_GFSK_1K2_REGISTERS,
        [0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    );
}

const REFERENCE_433_92_GFSK_1K2_REGISTERS: [RegisterSetting; 31] = {
    use ConfigRegister as R;
    [
        RegisterSetting::new(R::Iocfg2, GdoSignal::ChipReadyN.bits()),
        RegisterSetting::new(R::Iocfg0, GdoSignal::SyncWord.bits()),
        RegisterSetting::new(R::Fifothr, 0x47),
        RegisterSetting::new(R::Pktctrl1, Pktctrl1::APPEND_STATUS.bits()),
        RegisterSetting::new(
            R::Pktctrl0,
            Pktctrl0::CRC_EN.union(Pktctrl0::VARIABLE_LENGTH).bits(),
        ),
        RegisterSetting::new(R::Addr, 0x00),
        RegisterSetting::new(R::Channr, 0x00),
        // FREQ word 0x10B13B is 434.00 MHz with a 26 MHz crystal, inside the 433.92 MHz channel
        RegisterSetting::new(R::Fsctrl1, 0x06),
        RegisterSetting::new(R::Fsctrl0, 0x00),
        RegisterSetting::new(R::Freq2, 0x10),
        RegisterSetting::new(R::Freq1, 0xB1),
        RegisterSetting::new(R::Freq0, 0x3B),
        // GFSK, 1.2 kbps, 30/32 sync bits
        RegisterSetting::new(R::Mdmcfg4, 0xF5),
        RegisterSetting::new(R::Mdmcfg3, 0x83),
        RegisterSetting::new(R::Mdmcfg2, 0x13),
        RegisterSetting::new(R::Mdmcfg1, 0x22),
        RegisterSetting::new(R::Mdmcfg0, 0xF8),
        RegisterSetting::new(R::Deviatn, 0x15),
        // calibrate when going from IDLE to RX or TX
        RegisterSetting::new(R::Mcsm0, 0x18),
        RegisterSetting::new(R::Foccfg, 0x16),
        RegisterSetting::new(R::Bscfg, 0x6C),
        RegisterSetting::new(R::Agcctrl2, 0x03),
        RegisterSetting::new(R::Agcctrl1, 0x40),
        RegisterSetting::new(R::Agcctrl0, 0x91),
        RegisterSetting::new(R::Frend1, 0x56),
        RegisterSetting::new(R::Frend0, 0x10),
        RegisterSetting::new(R::Fscal3, 0xE9),
        RegisterSetting::new(R::Fscal2, 0x2A),
        RegisterSetting::new(R::Fscal1, 0x00),
        RegisterSetting::new(R::Fscal0, 0x1F),
        RegisterSetting::new(R::Test2, 0x59),
    ]
};
