//! CC1101 transceiver lifecycle
//!
//! [`Transceiver`] combines the register interface with the GDO lines and a delay
//! provider, and implements the operations an application uses:
//!
//! - [`Transceiver::configure`]: reset, apply a [`Profile`], optionally verify it
//! - [`Transceiver::rx`]: start listening
//! - [`Transceiver::tx`]: send one packet and wait for completion
//! - [`Transceiver::read`] / [`Transceiver::receive`]: drain one received packet
//! - [`Transceiver::read_rssi`]: current signal strength
//!
//! # State Machine
//! ```text
//! Uninitialized --configure--> Configuring --ok--> Ready
//!                                    \----err--> Failed
//! ```
//! `configure` may be called again from any state. Beyond this, the only state is the
//! radio's own control state machine, which can be inspected with
//! [`Transceiver::machine_state`].
//!
//! # Reception
//! The driver is polled. The ready line (GDO0 in the reference profile) asserts when
//! a sync word is detected and de-asserts at the end of the packet. Sample it with
//! [`Transceiver::data_ready`], or await it with [`Transceiver::wait_for_packet`] when
//! the pin supports `embedded_hal_async::digital::Wait`. After each packet call
//! [`Transceiver::rx`] again to re-arm reception.

use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, InputPin, OutputPin},
    spi::SpiBus,
};
use embedded_hal_async::digital::Wait;

use crate::{
    config::{Config, WaitPolicy},
    device::Device,
    error::Error,
    packet::{Reception, FRAME_OVERHEAD, MAX_PACKET_LEN},
    profile::Profile,
    registers::{ChipVersion, MachineState, MarcState, PartNumber, RssiStatus, RxBytes, Strobe, PATABLE},
};

/// Placeholder for an unconnected secondary line
///
/// Always reads low.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Lines are bound, the chip has not been reset by this driver
    Uninitialized,
    /// A profile is being applied
    Configuring,
    /// The last `configure` succeeded
    Ready,
    /// The last `configure` failed; the register contents are unknown
    Failed,
}

/// CC1101 transceiver
///
/// # Type Parameters
/// * `SPI` - SPI bus, exclusively owned
/// * `CS` - chip-select output
/// * `RDY` - ready line input (GDO0)
/// * `DLY` - delay provider for settle and completion waits
/// * `SEC` - optional secondary line input (GDO2), [`NoPin`] when unused
pub struct Transceiver<SPI, CS, RDY, DLY, SEC = NoPin> {
    device: Device<SPI, CS>,
    ready: RDY,
    secondary: Option<SEC>,
    delay: DLY,
    config: Config,
    state: State,
}

impl<SPI, CS, RDY, DLY> Transceiver<SPI, CS, RDY, DLY, NoPin>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Binds the bus and lines and deasserts chip-select.
    ///
    /// The chip is not touched otherwise; call [`Transceiver::configure`] next.
    pub fn new(
        spi: SPI,
        cs: CS,
        ready: RDY,
        delay: DLY,
        config: Config,
    ) -> Result<Self, Error<SPI::Error>> {
        Ok(Self {
            device: Device::new(spi, cs)?,
            ready,
            secondary: None,
            delay,
            config,
            state: State::Uninitialized,
        })
    }

    /// Binds the secondary line (GDO2).
    pub fn with_secondary_line<SEC>(self, secondary: SEC) -> Transceiver<SPI, CS, RDY, DLY, SEC> {
        Transceiver {
            device: self.device,
            ready: self.ready,
            secondary: Some(secondary),
            delay: self.delay,
            config: self.config,
            state: self.state,
        }
    }
}

impl<SPI, CS, RDY, DLY, SEC> Transceiver<SPI, CS, RDY, DLY, SEC> {
    /// Lifecycle state, [`State::Failed`] after an unsuccessful [`Transceiver::configure`]
    pub fn state(&self) -> State {
        self.state
    }

    /// Timing and verification policy given at construction
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct register access, for diagnostics
    pub fn device(&mut self) -> &mut Device<SPI, CS> {
        &mut self.device
    }

    /// Releases the bus, chip-select, ready line, delay and secondary line.
    pub fn release(self) -> (SPI, CS, RDY, DLY, Option<SEC>) {
        let (spi, cs) = self.device.release();
        (spi, cs, self.ready, self.delay, self.secondary)
    }
}

impl<SPI, CS, RDY, DLY, SEC> Transceiver<SPI, CS, RDY, DLY, SEC>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    DLY: DelayNs,
    SEC: InputPin,
{
    /// Resets the chip and applies `profile`.
    ///
    /// # Sequence
    /// 1. SRES strobe
    /// 2. Settle wait ([`Config::reset_settle`])
    /// 3. One single write per profile register, in order
    /// 4. Burst write of the PA table
    /// 5. Read-back of every profile register when [`Config::verify`] is set
    ///
    /// # Errors
    /// * `Error::Bus` / `Error::Pin` - communication failed
    /// * `Error::Timeout` - the chip did not report ready after reset
    /// * `Error::Verification` - a register read back a different value
    pub fn configure(&mut self, profile: &Profile) -> Result<(), Error<SPI::Error>> {
        log::info!("configuring CC1101 with profile {}", profile.name());
        self.state = State::Configuring;

        match self.apply_profile(profile) {
            Ok(()) => {
                self.state = State::Ready;
                log::info!("CC1101 ready");
                Ok(())
            }
            Err(err) => {
                self.state = State::Failed;
                log::error!("CC1101 configuration failed: {:?}", err);
                Err(err)
            }
        }
    }

    fn apply_profile(&mut self, profile: &Profile) -> Result<(), Error<SPI::Error>> {
        self.device.strobe(Strobe::Reset)?;
        self.settle_after_reset()?;

        for setting in profile.registers() {
            self.device.write_register(setting.register, setting.value)?;
        }
        self.device.write_burst(PATABLE, profile.patable())?;

        if self.config.verify {
            for setting in profile.registers() {
                let actual = self.device.read_register(setting.register)?;
                if actual != setting.value {
                    return Err(Error::Verification {
                        address: setting.register.addr(),
                        expected: setting.value,
                        actual,
                    });
                }
            }
            log::debug!("verified {} registers", profile.registers().len());
        }

        Ok(())
    }

    fn settle_after_reset(&mut self) -> Result<(), Error<SPI::Error>> {
        match self.config.reset_settle {
            WaitPolicy::FixedDelay { ms } => {
                self.delay.delay_ms(ms);
                Ok(())
            }
            WaitPolicy::ReadyLine {
                poll_interval_us,
                timeout_ms,
            } => match self.secondary.as_mut() {
                // GDO2 defaults to CHIP_RDYn after reset
                Some(chip_ready_n) => wait_for_level(
                    chip_ready_n,
                    &mut self.delay,
                    false,
                    poll_interval_us,
                    timeout_ms,
                ),
                None => {
                    log::warn!("no secondary line bound, waiting {} ms after reset", timeout_ms);
                    self.delay.delay_ms(timeout_ms);
                    Ok(())
                }
            },
        }
    }

    /// Enters RX.
    ///
    /// Valid after `configure` and after every received packet; the radio may fall back
    /// to IDLE at the end of a packet depending on MCSM1.
    pub fn rx(&mut self) -> Result<(), Error<SPI::Error>> {
        log::trace!("entering RX");
        self.device.strobe(Strobe::Rx)
    }

    /// Sends one packet.
    ///
    /// Goes to IDLE, flushes the TX FIFO, queues the length-prefixed payload, strobes
    /// STX and then waits according to [`Config::tx_completion`]. The radio is left in
    /// the state selected by MCSM1.TXOFF_MODE (IDLE in the reference profile); call
    /// [`Transceiver::rx`] to listen again.
    ///
    /// # Errors
    /// * `Error::PayloadLength` - `payload` is empty or longer than 64 bytes
    /// * `Error::Timeout` - the ready line did not signal the end of the packet
    pub fn tx(&mut self, payload: &[u8]) -> Result<(), Error<SPI::Error>> {
        if payload.is_empty() || payload.len() > MAX_PACKET_LEN {
            return Err(Error::PayloadLength(payload.len()));
        }

        self.device.strobe(Strobe::Idle)?;
        self.device.strobe(Strobe::FlushTx)?;
        self.device.write_packet(payload)?;
        self.device.strobe(Strobe::Tx)?;
        log::debug!("transmitting {} bytes", payload.len());

        match self.config.tx_completion {
            WaitPolicy::FixedDelay { ms } => {
                self.delay.delay_ms(ms);
                Ok(())
            }
            WaitPolicy::ReadyLine {
                poll_interval_us,
                timeout_ms,
            } => {
                // sync word sent, then end of packet
                wait_for_level(
                    &mut self.ready,
                    &mut self.delay,
                    true,
                    poll_interval_us,
                    timeout_ms,
                )
                .and_then(|()| {
                    wait_for_level(
                        &mut self.ready,
                        &mut self.delay,
                        false,
                        poll_interval_us,
                        timeout_ms,
                    )
                })
            }
        }
    }

    /// Drains one packet into `buf` and returns the number of bytes copied.
    ///
    /// Malformed frames and CRC failures both return 0, the same as an empty FIFO.
    /// Use [`Transceiver::receive`] to tell them apart.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error<SPI::Error>> {
        Ok(self.device.read_packet(buf)?.bytes_written())
    }

    /// Drains one packet into `buf`, reporting why nothing was delivered.
    ///
    /// Checks RXBYTES first: an overflowed FIFO is flushed and gives
    /// [`Reception::Overflow`]. Fewer bytes than a length byte plus the status trailer
    /// cannot hold a whole frame, so they give [`Reception::NoData`] and stay in the FIFO.
    ///
    /// Reading the length byte consumes it, so a frame that is longer than what has
    /// arrived so far cannot be left in place. Call this once the frame has ended, e.g.
    /// when a ready line mapped to [`GdoSignal::SyncWord`](crate::GdoSignal::SyncWord) falls.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<Reception, Error<SPI::Error>> {
        let fifo: RxBytes = self.device.read_status_register()?;

        if fifo.overflow {
            log::warn!("RX FIFO overflow, flushing");
            self.device.strobe(Strobe::FlushRx)?;
            return Ok(Reception::Overflow);
        }
        if usize::from(fifo.count) < FRAME_OVERHEAD {
            if fifo.count > 0 {
                log::debug!("{} bytes in RX FIFO, frame still arriving", fifo.count);
            }
            return Ok(Reception::NoData);
        }

        self.device.read_packet(buf)
    }

    /// Current signal strength in dBm.
    pub fn read_rssi(&mut self) -> Result<i16, Error<SPI::Error>> {
        let rssi: RssiStatus = self.device.read_status_register()?;
        Ok(rssi.dbm())
    }

    /// Samples the ready line.
    pub fn data_ready(&mut self) -> Result<bool, Error<SPI::Error>> {
        self.ready.is_high().map_err(|_| Error::Pin)
    }

    /// Samples the secondary line, `None` when it is not bound.
    pub fn secondary_line(&mut self) -> Result<Option<bool>, Error<SPI::Error>> {
        self.secondary
            .as_mut()
            .map(|pin| pin.is_high())
            .transpose()
            .map_err(|_| Error::Pin)
    }

    /// Current state of the radio control state machine.
    pub fn machine_state(&mut self) -> Result<MachineState, Error<SPI::Error>> {
        let marc: MarcState = self.device.read_status_register()?;
        Ok(marc.state)
    }

    /// Part number and version, `(0x00, 0x14)` on current silicon.
    pub fn chip_info(&mut self) -> Result<(u8, u8), Error<SPI::Error>> {
        let part: PartNumber = self.device.read_status_register()?;
        let version: ChipVersion = self.device.read_status_register()?;
        Ok((part.value, version.value))
    }

    /// Issues an arbitrary command strobe.
    pub fn strobe(&mut self, strobe: Strobe) -> Result<(), Error<SPI::Error>> {
        self.device.strobe(strobe)
    }

    /// Leaves RX/TX.
    pub fn idle(&mut self) -> Result<(), Error<SPI::Error>> {
        self.device.strobe(Strobe::Idle)
    }

    /// Calibrates the frequency synthesizer. Only valid in IDLE.
    pub fn calibrate(&mut self) -> Result<(), Error<SPI::Error>> {
        self.device.strobe(Strobe::Calibrate)
    }
}

impl<SPI, CS, RDY, DLY, SEC> Transceiver<SPI, CS, RDY, DLY, SEC>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin + Wait,
    DLY: DelayNs,
    SEC: InputPin,
{
    /// Waits for the ready line to assert.
    ///
    /// For ready lines backed by an interrupt (e.g. an EXTI input), this replaces
    /// polling [`Transceiver::data_ready`].
    pub async fn wait_for_packet(&mut self) -> Result<(), Error<SPI::Error>> {
        self.ready.wait_for_high().await.map_err(|_| Error::Pin)
    }

    /// Waits for the ready line, then drains one packet.
    pub async fn receive_async(&mut self, buf: &mut [u8]) -> Result<Reception, Error<SPI::Error>> {
        self.wait_for_packet().await?;
        self.receive(buf)
    }
}

fn wait_for_level<P, D, E>(
    pin: &mut P,
    delay: &mut D,
    high: bool,
    poll_interval_us: u32,
    timeout_ms: u32,
) -> Result<(), Error<E>>
where
    P: InputPin,
    D: DelayNs,
{
    for _ in 0..WaitPolicy::poll_budget(poll_interval_us, timeout_ms) {
        if pin.is_high().map_err(|_| Error::Pin)? == high {
            return Ok(());
        }
        delay.delay_us(poll_interval_us);
    }
    log::warn!("line did not go {} within {} ms", if high { "high" } else { "low" }, timeout_ms);
    Err(Error::Timeout)
}

/// Packet radio operations used by the application loop
///
/// Implemented by [`Transceiver`]; the [`Terminal`](crate::Terminal) only depends on
/// this trait so a different radio, or a test double, can be plugged in.
pub trait PacketRadio {
    type Error: core::fmt::Debug;

    /// Resets the radio and applies `profile`
    fn configure(&mut self, profile: &Profile) -> Result<(), Self::Error>;
    /// Enters receive mode
    fn rx(&mut self) -> Result<(), Self::Error>;
    /// Sends one packet and waits for it to leave the air
    fn tx(&mut self, payload: &[u8]) -> Result<(), Self::Error>;
    /// Drains one packet into `buf`, returning the bytes copied (0 when nothing usable)
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
    /// Signal strength in dBm
    fn read_rssi(&mut self) -> Result<i16, Self::Error>;
    /// Whether the ready line signals a packet
    fn data_ready(&mut self) -> Result<bool, Self::Error>;
}

impl<SPI, CS, RDY, DLY, SEC> PacketRadio for Transceiver<SPI, CS, RDY, DLY, SEC>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    DLY: DelayNs,
    SEC: InputPin,
{
    type Error = Error<SPI::Error>;

    fn configure(&mut self, profile: &Profile) -> Result<(), Self::Error> {
        Transceiver::configure(self, profile)
    }

    fn rx(&mut self) -> Result<(), Self::Error> {
        Transceiver::rx(self)
    }

    fn tx(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        Transceiver::tx(self, payload)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Transceiver::read(self, buf)
    }

    fn read_rssi(&mut self) -> Result<i16, Self::Error> {
        Transceiver::read_rssi(self)
    }

    fn data_ready(&mut self) -> Result<bool, Self::Error> {
        Transceiver::data_ready(self)
    }
}
