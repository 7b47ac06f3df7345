//! Emulated CC1101 for integration tests
//!
//! `FakeChip` (the SPI bus), `FakeCs` (chip-select) and `FakeLine` (GDO inputs) share one
//! `ChipState`, so a test can inspect registers and FIFOs after driving the public API.
//! Only what the driver touches is emulated: the register file, PATABLE, both FIFOs,
//! strobes, and the status registers the driver reads.

#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, convert::Infallible, rc::Rc};

use cc1101_radio::{Config, Transceiver};
use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorKind, ErrorType, InputPin, OutputPin},
    spi::{self, SpiBus},
};
use embedded_hal_async::digital::Wait;

pub const MARC_IDLE: u8 = 0x01;
pub const MARC_RX: u8 = 0x0D;
pub const MARC_TX: u8 = 0x13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Strobe,
    Register { addr: u8, read: bool, burst: bool, offset: u8 },
    Status(u8),
}

#[derive(Debug)]
pub struct ChipState {
    pub registers: [u8; 0x2F],
    pub patable: [u8; 8],
    patable_index: usize,
    pub tx_fifo: Vec<u8>,
    pub rx_fifo: VecDeque<u8>,
    pub rx_overflow: bool,
    pub marc: u8,
    pub rssi: u8,
    pub lqi: u8,
    pub strobes: Vec<u8>,

    /// TX frames are copied into the RX FIFO with a status trailer
    pub loopback: bool,
    /// CRC_OK bit in the trailer of looped-back frames
    pub loopback_crc_ok: bool,
    /// Register that always reads this value
    pub stuck: Option<(u8, u8)>,
    /// Ready line levels played back after each STX
    pub tx_ready_script: Vec<bool>,

    pub ready_levels: VecDeque<bool>,
    pub ready_idle_level: bool,
    pub chip_ready_n: bool,

    cs_low: bool,
    access: Option<Access>,
    pub transactions: usize,
    pub cs_violations: usize,
}

impl Default for ChipState {
    fn default() -> Self {
        Self {
            registers: [0; 0x2F],
            patable: [0; 8],
            patable_index: 0,
            tx_fifo: Vec::new(),
            rx_fifo: VecDeque::new(),
            rx_overflow: false,
            marc: MARC_IDLE,
            rssi: 0x20,
            lqi: 0x05,
            strobes: Vec::new(),
            loopback: true,
            loopback_crc_ok: true,
            stuck: None,
            tx_ready_script: vec![false, true, true, false],
            ready_levels: VecDeque::new(),
            ready_idle_level: false,
            chip_ready_n: false,
            cs_low: false,
            access: None,
            transactions: 0,
            cs_violations: 0,
        }
    }
}

impl ChipState {
    /// Queues a raw frame (length byte, payload, trailer) into the RX FIFO.
    pub fn inject_frame(&mut self, payload: &[u8], crc_ok: bool) {
        self.rx_fifo.push_back(payload.len() as u8);
        self.rx_fifo.extend(payload.iter().copied());
        self.rx_fifo.push_back(self.rssi);
        self.rx_fifo.push_back(if crc_ok { 0x80 } else { 0x00 } | self.lqi);
    }

    pub fn register(&self, addr: u8) -> u8 {
        self.registers[addr as usize]
    }

    fn exchange(&mut self, byte: u8) -> u8 {
        if !self.cs_low {
            self.cs_violations += 1;
            return 0xFF;
        }

        match self.access {
            None => {
                self.begin(byte);
                // chip status byte: CHIP_RDYn low, state bits, FIFO bytes available
                0x0F
            }
            Some(Access::Strobe) => {
                // strobes are a single byte
                self.cs_violations += 1;
                0xFF
            }
            Some(Access::Status(addr)) => self.status(addr),
            Some(Access::Register {
                addr,
                read,
                burst,
                offset,
            }) => {
                let value = self.data(addr + offset, read, byte);
                if burst && addr < 0x2F {
                    self.access = Some(Access::Register {
                        addr,
                        read,
                        burst,
                        offset: offset + 1,
                    });
                }
                value
            }
        }
    }

    fn begin(&mut self, header: u8) {
        let addr = header & 0x3F;
        let read = header & 0x80 != 0;
        let burst = header & 0x40 != 0;

        self.access = Some(if (0x30..=0x3D).contains(&addr) {
            if read && burst {
                Access::Status(addr)
            } else {
                self.strobe(addr);
                Access::Strobe
            }
        } else {
            Access::Register {
                addr,
                read,
                burst,
                offset: 0,
            }
        });
    }

    fn data(&mut self, addr: u8, read: bool, byte: u8) -> u8 {
        match (addr, read) {
            (0x3F, true) => self.rx_fifo.pop_front().unwrap_or(0),
            (0x3F, false) => {
                self.tx_fifo.push(byte);
                0x0F
            }
            (0x3E, true) => {
                let value = self.patable[self.patable_index % 8];
                self.patable_index += 1;
                value
            }
            (0x3E, false) => {
                self.patable[self.patable_index % 8] = byte;
                self.patable_index += 1;
                0x0F
            }
            (addr, true) if addr < 0x2F => match self.stuck {
                Some((stuck, value)) if stuck == addr => value,
                _ => self.registers[addr as usize],
            },
            (addr, false) if addr < 0x2F => {
                self.registers[addr as usize] = byte;
                0x0F
            }
            _ => 0x00,
        }
    }

    fn status(&mut self, addr: u8) -> u8 {
        match addr {
            0x30 => 0x00,
            0x31 => 0x14,
            0x33 => 0x80 | self.lqi,
            0x34 => self.rssi,
            0x35 => self.marc,
            0x3A => self.tx_fifo.len().min(0x7F) as u8,
            0x3B => {
                let overflow = if self.rx_overflow { 0x80 } else { 0x00 };
                overflow | self.rx_fifo.len().min(0x7F) as u8
            }
            _ => 0x00,
        }
    }

    fn strobe(&mut self, opcode: u8) {
        self.strobes.push(opcode);

        match opcode {
            0x30 => {
                // test setup and bookkeeping survive the reset
                let fresh = Self {
                    loopback: self.loopback,
                    loopback_crc_ok: self.loopback_crc_ok,
                    stuck: self.stuck,
                    tx_ready_script: core::mem::take(&mut self.tx_ready_script),
                    ready_idle_level: self.ready_idle_level,
                    chip_ready_n: self.chip_ready_n,
                    strobes: core::mem::take(&mut self.strobes),
                    transactions: self.transactions,
                    cs_violations: self.cs_violations,
                    cs_low: self.cs_low,
                    ..Self::default()
                };
                *self = fresh;
            }
            0x34 => self.marc = MARC_RX,
            0x35 => {
                self.marc = MARC_TX;
                self.ready_levels = self.tx_ready_script.iter().copied().collect();
                if self.loopback && !self.tx_fifo.is_empty() {
                    let frame: Vec<u8> = self.tx_fifo.drain(..).collect();
                    self.rx_fifo.extend(frame);
                    self.rx_fifo.push_back(self.rssi);
                    let crc = if self.loopback_crc_ok { 0x80 } else { 0x00 };
                    self.rx_fifo.push_back(crc | self.lqi);
                } else {
                    self.tx_fifo.clear();
                }
                // TXOFF_MODE = IDLE
                self.marc = MARC_IDLE;
            }
            0x36 => self.marc = MARC_IDLE,
            0x3A => {
                self.rx_fifo.clear();
                self.rx_overflow = false;
            }
            0x3B => self.tx_fifo.clear(),
            _ => {}
        }
    }
}

pub type Shared = Rc<RefCell<ChipState>>;

/// SPI side of the emulated chip
pub struct FakeChip(pub Shared);

impl spi::ErrorType for FakeChip {
    type Error = Infallible;
}

impl SpiBus<u8> for FakeChip {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        for word in words.iter_mut() {
            *word = chip.exchange(0x00);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        for &word in words {
            chip.exchange(word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        for i in 0..read.len().max(write.len()) {
            let value = chip.exchange(write.get(i).copied().unwrap_or(0x00));
            if let Some(slot) = read.get_mut(i) {
                *slot = value;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        for word in words.iter_mut() {
            *word = chip.exchange(*word);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Chip-select of the emulated chip
pub struct FakeCs(pub Shared);

impl ErrorType for FakeCs {
    type Error = Infallible;
}

impl OutputPin for FakeCs {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        if chip.cs_low {
            chip.cs_violations += 1;
        }
        chip.cs_low = true;
        chip.access = None;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        if chip.cs_low {
            chip.transactions += 1;
        }
        chip.cs_low = false;
        chip.access = None;
        chip.patable_index = 0;
        Ok(())
    }
}

impl FakeCs {
    pub fn is_low(&self) -> bool {
        self.0.borrow().cs_low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gdo {
    /// GDO0 as sync word: plays back the levels queued by STX
    Ready,
    /// GDO2 as CHIP_RDYn
    ChipReadyN,
}

/// GDO input of the emulated chip
pub struct FakeLine(pub Shared, pub Gdo);

impl ErrorType for FakeLine {
    type Error = Infallible;
}

impl InputPin for FakeLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut chip = self.0.borrow_mut();
        Ok(match self.1 {
            Gdo::Ready => {
                let idle = chip.ready_idle_level;
                chip.ready_levels.pop_front().unwrap_or(idle)
            }
            Gdo::ChipReadyN => chip.chip_ready_n,
        })
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl FakeLine {
    /// Samples until the line reads `high`, panicking once the played back levels
    /// run out and the idle level can never get there.
    fn settle_at(&mut self, high: bool) {
        loop {
            let level = self.is_high().unwrap();
            if level == high {
                return;
            }
            let chip = self.0.borrow();
            let stuck = match self.1 {
                Gdo::Ready => chip.ready_levels.is_empty() && chip.ready_idle_level != high,
                Gdo::ChipReadyN => true,
            };
            assert!(!stuck, "{:?} line never goes {}", self.1, if high { "high" } else { "low" });
        }
    }
}

impl Wait for FakeLine {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        self.settle_at(true);
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        self.settle_at(false);
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.settle_at(false);
        self.settle_at(true);
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.settle_at(true);
        self.settle_at(false);
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        let level = self.is_high().unwrap();
        self.settle_at(!level);
        Ok(())
    }
}

/// Input whose GPIO driver has failed
pub struct BrokenLine;

impl ErrorType for BrokenLine {
    type Error = ErrorKind;
}

impl InputPin for BrokenLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(ErrorKind::Other)
    }
}

impl Wait for BrokenLine {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }
}

/// Delay provider that records how long the driver slept
#[derive(Clone, Default)]
pub struct FakeDelay(pub Rc<RefCell<u64>>);

impl FakeDelay {
    pub fn total_ns(&self) -> u64 {
        *self.0.borrow()
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.0.borrow_mut() += ns as u64;
    }
}

pub type FakeRadio = Transceiver<FakeChip, FakeCs, FakeLine, FakeDelay>;

/// Transceiver wired to a fresh emulated chip
pub fn radio(config: Config) -> (FakeRadio, Shared, FakeDelay) {
    let chip: Shared = Rc::new(RefCell::new(ChipState::default()));
    let delay = FakeDelay::default();
    let radio = Transceiver::new(
        FakeChip(chip.clone()),
        FakeCs(chip.clone()),
        FakeLine(chip.clone(), Gdo::Ready),
        delay.clone(),
        config,
    )
    .unwrap();
    (radio, chip, delay)
}
