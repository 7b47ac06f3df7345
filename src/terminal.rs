//! Handheld terminal glue
//!
//! The radio is the only part of the handheld with protocol content. The display console
//! and the touch panel are external collaborators, represented here by the [`Console`]
//! and [`TouchSampler`] traits, and [`Terminal`] runs one iteration of the polling loop
//! that ties them to a [`PacketRadio`].
//!
//! Each [`Terminal::tick`]:
//! 1. If the ready line is high, drains one packet, logs it as hex and text and re-arms RX
//! 2. Every `rssi_interval` ticks, logs the signal strength with a bar graph
//! 3. Samples the touch panel and logs the calibrated point while it is pressed
//!
//! The caller owns the loop cadence (10 ms in the reference handheld).

use core::fmt::{self, Write};

use heapless::String;

use crate::{packet::MAX_PACKET_LEN, profile::Profile, transceiver::PacketRadio};

/// Capacity of one console line, enough for a full 64-byte packet in hex
pub const LINE_CAPACITY: usize = 160;

/// Longest RSSI bar
pub const RSSI_BAR_MAX: usize = 15;

type Line = String<LINE_CAPACITY>;

/// Console severity, rendered as a text color on the handheld
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// White
    Info,
    /// Yellow
    Warn,
    /// Red
    Error,
}

/// Line-oriented text log
pub trait Console {
    /// Appends one line. Lines longer than the display are the console's to wrap or cut.
    fn log(&mut self, level: Level, line: &str);

    /// Logs at [`Level::Info`]
    fn info(&mut self, line: &str) {
        self.log(Level::Info, line)
    }

    /// Logs at [`Level::Warn`]
    fn warn(&mut self, line: &str) {
        self.log(Level::Warn, line)
    }

    /// Logs at [`Level::Error`]
    fn error(&mut self, line: &str) {
        self.log(Level::Error, line)
    }
}

/// Raw touch sample
///
/// `pressure` is 0 when nothing touches the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    /// Raw X reading, 12 bits on the XPT2046
    pub x: u16,
    /// Raw Y reading
    pub y: u16,
    /// Z1/Z2 plate pressure, 0 when released
    pub pressure: u16,
}

impl TouchPoint {
    pub fn pressed(&self) -> bool {
        self.pressure > 0
    }
}

/// Resistive touch controller
pub trait TouchSampler {
    type Error: fmt::Debug;

    fn sample(&mut self) -> Result<TouchPoint, Self::Error>;
}

/// Raw-to-screen mapping of the touch panel
///
/// Swap `screen_min`/`screen_max` of an axis to mirror it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Raw X readings at the left and right screen edges
    pub raw_x: (i32, i32),
    /// Raw Y readings at the top and bottom screen edges
    pub raw_y: (i32, i32),
    /// Pixel columns the raw X range maps onto
    pub screen_x: (i32, i32),
    /// Pixel rows the raw Y range maps onto
    pub screen_y: (i32, i32),
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            raw_x: (300, 3800),
            raw_y: (200, 3700),
            screen_x: (0, 240),
            screen_y: (0, 320),
        }
    }
}

impl Calibration {
    /// Screen coordinates of a raw sample, clamped to the screen
    pub fn map(&self, point: TouchPoint) -> (i32, i32) {
        (
            map_range(point.x as i32, self.raw_x, self.screen_x),
            map_range(point.y as i32, self.raw_y, self.screen_y),
        )
    }
}

fn map_range(value: i32, (in_min, in_max): (i32, i32), (out_min, out_max): (i32, i32)) -> i32 {
    if in_min == in_max {
        return out_min;
    }
    // spans of two i32 ranges multiplied need 65 bits
    let (value, in_min, in_max) = (i128::from(value), i128::from(in_min), i128::from(in_max));
    let (lo, hi) = (out_min.min(out_max), out_min.max(out_max));
    let (out_min, out_max) = (i128::from(out_min), i128::from(out_max));

    let mapped = (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min;
    mapped.clamp(i128::from(lo), i128::from(hi)) as i32
}

/// Length of the RSSI bar for `rssi` dBm: one segment per 5 dB above -100 dBm
pub fn rssi_bar_len(rssi: i16) -> usize {
    ((rssi as i32 + 100) / 5).clamp(0, RSSI_BAR_MAX as i32) as usize
}

/// What one [`Terminal::tick`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Payload length of the packet drained this tick
    pub received: Option<usize>,
    /// Signal strength sampled this tick
    pub rssi: Option<i16>,
    /// Calibrated touch position sampled this tick
    pub touch: Option<(i32, i32)>,
}

/// One handheld: radio, console and touch panel
pub struct Terminal<R, C, T> {
    radio: R,
    console: C,
    touch: T,
    calibration: Calibration,
    rssi_interval: u32,
    ticks: u32,
    buf: [u8; MAX_PACKET_LEN],
}

impl<R, C, T> Terminal<R, C, T>
where
    R: PacketRadio,
    C: Console,
    T: TouchSampler,
{
    /// Terminal with the default calibration, logging the RSSI every 10 ticks
    pub fn new(radio: R, console: C, touch: T) -> Self {
        Self {
            radio,
            console,
            touch,
            calibration: Calibration::default(),
            rssi_interval: 10,
            ticks: 0,
            buf: [0; MAX_PACKET_LEN],
        }
    }

    /// Replaces the touch calibration
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Log the RSSI every `interval` ticks, never when 0
    pub fn with_rssi_interval(mut self, interval: u32) -> Self {
        self.rssi_interval = interval;
        self
    }

    /// The radio, e.g. to transmit between ticks
    pub fn radio(&mut self) -> &mut R {
        &mut self.radio
    }

    /// The console the poll step writes to
    pub fn console(&mut self) -> &mut C {
        &mut self.console
    }

    /// Gives back the radio, console and touch panel.
    pub fn release(self) -> (R, C, T) {
        (self.radio, self.console, self.touch)
    }

    /// Configures the radio with `profile` and starts listening.
    ///
    /// The outcome is reported on the console as well as returned.
    pub fn start(&mut self, profile: &Profile) -> Result<(), R::Error> {
        self.console.info("Init CC1101...");

        if let Err(err) = self.radio.configure(profile) {
            log::error!("radio configuration failed: {:?}", err);
            self.console.error("CC1101: Init Failed!");
            return Err(err);
        }

        let line = format_line(format_args!("CC1101: Ready ({})", profile.name()));
        self.console.info(&line);
        self.radio.rx()
    }

    /// Runs one iteration of the polling loop.
    ///
    /// # Errors
    /// Radio errors are returned as-is; the next tick may be attempted regardless.
    /// Touch errors are logged and otherwise ignored.
    pub fn tick(&mut self) -> Result<TickReport, R::Error> {
        self.ticks = self.ticks.wrapping_add(1);
        let mut report = TickReport::default();

        if self.radio.data_ready()? {
            let len = self.radio.read(&mut self.buf)?;
            if len > 0 {
                self.log_packet(len);
                // the radio may have dropped to IDLE at the end of the packet
                self.radio.rx()?;
                report.received = Some(len);
            }
        }

        if self.rssi_interval != 0 && self.ticks % self.rssi_interval == 0 {
            let rssi = self.radio.read_rssi()?;
            let mut line = format_line(format_args!("RSSI: {} ", rssi));
            for _ in 0..rssi_bar_len(rssi) {
                let _ = line.push('|');
            }
            self.console.info(&line);
            report.rssi = Some(rssi);
        }

        match self.touch.sample() {
            Ok(point) if point.pressed() => {
                let (x, y) = self.calibration.map(point);
                let line = format_line(format_args!(
                    "Touch: Raw({},{}) -> Screen({},{})",
                    point.x, point.y, x, y
                ));
                self.console.info(&line);
                report.touch = Some((x, y));
            }
            Ok(_) => {}
            Err(err) => log::warn!("touch sample failed: {:?}", err),
        }

        Ok(report)
    }

    fn log_packet(&mut self, len: usize) {
        let payload = &self.buf[..len];

        let mut line = format_line(format_args!("RX[{}]: ", len));
        for byte in payload {
            let _ = write!(line, "{:02X}", byte);
        }
        self.console.info(&line);

        let mut line = Line::new();
        let _ = line.push_str("Text: ");
        for &byte in payload {
            let shown = if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            };
            let _ = line.push(shown);
        }
        self.console.info(&line);
    }
}

/// Formats into a console line, truncating on overflow
fn format_line(args: fmt::Arguments<'_>) -> Line {
    let mut line = Line::new();
    let _ = line.write_fmt(args);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::VecDeque, string::String, string::ToString, vec, vec::Vec};

    #[derive(Default)]
    struct FakeRadio {
        configure_fails: bool,
        ready: bool,
        packets: VecDeque<Vec<u8>>,
        rssi: i16,
        rx_calls: usize,
    }

    impl PacketRadio for FakeRadio {
        type Error = &'static str;

        fn configure(&mut self, _profile: &Profile) -> Result<(), Self::Error> {
            if self.configure_fails {
                Err("verification")
            } else {
                Ok(())
            }
        }

        fn rx(&mut self) -> Result<(), Self::Error> {
            self.rx_calls += 1;
            Ok(())
        }

        fn tx(&mut self, _payload: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match self.packets.pop_front() {
                Some(packet) => {
                    let len = packet.len().min(buf.len());
                    buf[..len].copy_from_slice(&packet[..len]);
                    Ok(len)
                }
                None => Ok(0),
            }
        }

        fn read_rssi(&mut self) -> Result<i16, Self::Error> {
            Ok(self.rssi)
        }

        fn data_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(self.ready)
        }
    }

    #[derive(Default)]
    struct RecordingConsole {
        lines: Vec<(Level, String)>,
    }

    impl Console for RecordingConsole {
        fn log(&mut self, level: Level, line: &str) {
            self.lines.push((level, line.to_string()));
        }
    }

    struct FixedTouch(TouchPoint);

    impl TouchSampler for FixedTouch {
        type Error = ();

        fn sample(&mut self) -> Result<TouchPoint, Self::Error> {
            Ok(self.0)
        }
    }

    fn untouched() -> FixedTouch {
        FixedTouch(TouchPoint::default())
    }

    #[test]
    fn start_reports_failure() {
        let radio = FakeRadio {
            configure_fails: true,
            ..Default::default()
        };
        let mut terminal = Terminal::new(radio, RecordingConsole::default(), untouched());

        assert_eq!(
            terminal.start(&Profile::REFERENCE_433_92_GFSK_1K2),
            Err("verification")
        );
        let (radio, console, _) = terminal.release();
        assert_eq!(radio.rx_calls, 0);
        assert_eq!(
            console.lines.last(),
            Some(&(Level::Error, "CC1101: Init Failed!".to_string()))
        );
    }

    #[test]
    fn start_arms_reception() {
        let mut terminal =
            Terminal::new(FakeRadio::default(), RecordingConsole::default(), untouched());

        terminal.start(&Profile::REFERENCE_433_92_GFSK_1K2).unwrap();

        assert_eq!(terminal.radio().rx_calls, 1);
        assert_eq!(
            terminal.console().lines.last().map(|(_, l)| l.as_str()),
            Some("CC1101: Ready (433.92MHz GFSK 1.2kbps)")
        );
    }

    #[test]
    fn tick_logs_packet_and_rearms() {
        let radio = FakeRadio {
            ready: true,
            packets: VecDeque::from(vec![b"Hi\x01".to_vec()]),
            ..Default::default()
        };
        let mut terminal = Terminal::new(radio, RecordingConsole::default(), untouched());

        let report = terminal.tick().unwrap();

        assert_eq!(report.received, Some(3));
        assert_eq!(terminal.radio().rx_calls, 1);
        let lines: Vec<&str> = terminal
            .console()
            .lines
            .iter()
            .map(|(_, l)| l.as_str())
            .collect();
        assert_eq!(lines, ["RX[3]: 486901", "Text: Hi."]);
    }

    #[test]
    fn empty_read_does_not_rearm() {
        let radio = FakeRadio {
            ready: true,
            ..Default::default()
        };
        let mut terminal = Terminal::new(radio, RecordingConsole::default(), untouched());

        assert_eq!(terminal.tick().unwrap().received, None);
        assert_eq!(terminal.radio().rx_calls, 0);
    }

    #[test]
    fn rssi_logged_every_interval() {
        let radio = FakeRadio {
            rssi: -60,
            ..Default::default()
        };
        let mut terminal = Terminal::new(radio, RecordingConsole::default(), untouched())
            .with_rssi_interval(3);

        let reports: Vec<TickReport> = (0..6).map(|_| terminal.tick().unwrap()).collect();

        let sampled: Vec<usize> = reports
            .iter()
            .enumerate()
            .filter(|(_, r)| r.rssi.is_some())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(sampled, [2, 5]);
        assert_eq!(terminal.console().lines[0].1, "RSSI: -60 ||||||||");
    }

    #[test]
    fn rssi_bar_is_clamped() {
        assert_eq!(rssi_bar_len(-138), 0);
        assert_eq!(rssi_bar_len(-100), 0);
        assert_eq!(rssi_bar_len(-74), 5);
        assert_eq!(rssi_bar_len(-11), 15);
    }

    #[test]
    fn touch_is_calibrated_and_clamped() {
        let calibration = Calibration::default();

        assert_eq!(
            calibration.map(TouchPoint {
                x: 300,
                y: 200,
                pressure: 1
            }),
            (0, 0)
        );
        assert_eq!(
            calibration.map(TouchPoint {
                x: 2050,
                y: 1950,
                pressure: 1
            }),
            (120, 160)
        );
        assert_eq!(
            calibration.map(TouchPoint {
                x: 4095,
                y: 0,
                pressure: 1
            }),
            (240, 0)
        );
    }

    #[test]
    fn mirrored_axis_and_degenerate_range() {
        assert_eq!(map_range(300, (300, 3800), (240, 0)), 240);
        assert_eq!(map_range(3800, (300, 3800), (240, 0)), 0);
        assert_eq!(map_range(1234, (500, 500), (0, 240)), 0);
    }

    #[test]
    fn extreme_calibration_does_not_overflow() {
        let full = (i32::MIN, i32::MAX);

        assert_eq!(map_range(0, full, full), 0);
        assert_eq!(map_range(i32::MAX, full, full), i32::MAX);
        assert_eq!(map_range(i32::MIN, full, (i32::MAX, i32::MIN)), i32::MAX);
        assert_eq!(map_range(4095, (0, 1), (0, i32::MAX)), i32::MAX);
        assert_eq!(map_range(0, (1, 0), (i32::MIN, i32::MAX)), i32::MAX);

        let calibration = Calibration {
            raw_x: (i32::MAX, i32::MIN),
            raw_y: (0, 1),
            screen_x: full,
            screen_y: (i32::MIN, 0),
        };
        let (x, y) = calibration.map(TouchPoint {
            x: 4095,
            y: 4095,
            pressure: 1,
        });
        assert_eq!(y, 0);
        assert!(x < 0);
    }

    #[test]
    fn pressed_touch_is_logged() {
        let touch = FixedTouch(TouchPoint {
            x: 2050,
            y: 1950,
            pressure: 80,
        });
        let mut terminal = Terminal::new(FakeRadio::default(), RecordingConsole::default(), touch);

        assert_eq!(terminal.tick().unwrap().touch, Some((120, 160)));
        assert_eq!(
            terminal.console().lines[0].1,
            "Touch: Raw(2050,1950) -> Screen(120,160)"
        );
    }
}
