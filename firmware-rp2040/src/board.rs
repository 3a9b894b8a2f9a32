//! GPIO and ADC ownership for the protocol's pin model.
//!
//! Pins 0-13 are digital and form port 0 (one 14-bit mask). Pins 14-16 are
//! the ADC inputs on GPIO 26-28 and are addressed as analog channels 0-2.

use defmt::{debug, warn};
use embassy_rp::adc::{Adc, Blocking, Channel as AdcChannel};
use embassy_rp::gpio::{Flex, Level, Pull};
use firmata_proto::PinMode;
use heapless::Vec;

/// Number of digital pins (one port).
pub const DIGITAL_PINS: usize = 14;

/// Number of ADC channels.
pub const ANALOG_CHANNELS: usize = 3;

/// Pin number of analog channel 0.
pub const FIRST_ANALOG_PIN: u8 = DIGITAL_PINS as u8;

/// Upper bound on reports produced by one sample.
pub const MAX_REPORTS: usize = ANALOG_CHANNELS + 1;

/// A value to send back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Report {
    /// A sampled ADC channel.
    Analog { channel: u8, value: u16 },
    /// Input levels of a digital port.
    Digital { port: u8, value: u16 },
}

/// Error type for commands the board cannot apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum BoardError {
    /// Pin number outside the pin table.
    NoSuchPin(u8),
    /// Port number other than 0.
    NoSuchPort(u8),
    /// Analog channel outside 0-2.
    NoSuchChannel(u8),
    /// Mode value not in [`PinMode`].
    UnknownMode(u16),
    /// The pin exists but cannot operate in this mode.
    UnsupportedMode { pin: u8, mode: PinMode },
}

/// Owns the pins driven by the protocol and tracks what to report.
pub struct Board<'d> {
    pins: [Flex<'d>; DIGITAL_PINS],
    modes: [PinMode; DIGITAL_PINS],
    adc: Adc<'d, Blocking>,
    analog: [AdcChannel<'d>; ANALOG_CHANNELS],
    /// Bit `n` set when analog channel `n` is reported.
    report_analog: u8,
    report_digital: bool,
    last_analog: [Option<u16>; ANALOG_CHANNELS],
    last_port: Option<u16>,
}

impl<'d> Board<'d> {
    /// Create a board with every digital pin as a pulled-down input.
    #[must_use]
    pub fn new(
        mut pins: [Flex<'d>; DIGITAL_PINS],
        adc: Adc<'d, Blocking>,
        analog: [AdcChannel<'d>; ANALOG_CHANNELS],
    ) -> Self {
        for pin in pins.iter_mut() {
            pin.set_as_input();
            pin.set_pull(Pull::Down);
        }
        Self {
            pins,
            modes: [PinMode::Input; DIGITAL_PINS],
            adc,
            analog,
            report_analog: 0,
            report_digital: false,
            last_analog: [None; ANALOG_CHANNELS],
            last_port: None,
        }
    }

    /// Current mode of a digital pin.
    #[must_use]
    pub fn pin_mode(&self, pin: u8) -> Option<PinMode> {
        self.modes.get(usize::from(pin)).copied()
    }

    /// Apply a set-pin-mode command.
    pub fn set_pin_mode(&mut self, pin: u8, mode: u16) -> Result<(), BoardError> {
        let mode = u8::try_from(mode)
            .ok()
            .and_then(|m| PinMode::try_from(m).ok())
            .ok_or(BoardError::UnknownMode(mode))?;

        if let Some(flex) = self.pins.get_mut(usize::from(pin)) {
            match mode {
                PinMode::Input => {
                    flex.set_as_input();
                    flex.set_pull(Pull::Down);
                }
                PinMode::Output => {
                    flex.set_low();
                    flex.set_as_output();
                }
                _ => return Err(BoardError::UnsupportedMode { pin, mode }),
            }
            self.modes[usize::from(pin)] = mode;
            debug!("pin {} set to {}", pin, mode);
            return Ok(());
        }

        match pin.checked_sub(FIRST_ANALOG_PIN) {
            Some(channel) if usize::from(channel) < ANALOG_CHANNELS => match mode {
                PinMode::Analog => Ok(()),
                _ => Err(BoardError::UnsupportedMode { pin, mode }),
            },
            _ => Err(BoardError::NoSuchPin(pin)),
        }
    }

    /// Drive the output pins of `port` from a 14-bit mask.
    ///
    /// Bits for pins not in output mode are ignored.
    pub fn write_port(&mut self, port: u8, mask: u16) -> Result<(), BoardError> {
        if port != 0 {
            return Err(BoardError::NoSuchPort(port));
        }
        for (bit, (flex, mode)) in self.pins.iter_mut().zip(self.modes.iter()).enumerate() {
            if *mode != PinMode::Output {
                continue;
            }
            let level = if mask & (1 << bit) != 0 {
                Level::High
            } else {
                Level::Low
            };
            flex.set_level(level);
        }
        Ok(())
    }

    /// Enable or disable reporting for an analog channel.
    pub fn set_report_analog(&mut self, channel: u8, enable: u16) -> Result<(), BoardError> {
        let index = usize::from(channel);
        if index >= ANALOG_CHANNELS {
            return Err(BoardError::NoSuchChannel(channel));
        }
        if enable != 0 {
            self.report_analog |= 1 << channel;
        } else {
            self.report_analog &= !(1 << channel);
        }
        // Force a report on the next sample after enabling.
        self.last_analog[index] = None;
        Ok(())
    }

    /// Enable or disable reporting for a digital port.
    pub fn set_report_digital(&mut self, port: u8, enable: u16) -> Result<(), BoardError> {
        if port != 0 {
            return Err(BoardError::NoSuchPort(port));
        }
        self.report_digital = enable != 0;
        self.last_port = None;
        Ok(())
    }

    /// Input levels of port 0 as a mask; output pins read as 0.
    #[must_use]
    pub fn read_port(&self) -> u16 {
        self.pins
            .iter()
            .zip(self.modes.iter())
            .enumerate()
            .filter(|(_, (flex, mode))| **mode == PinMode::Input && flex.is_high())
            .fold(0, |mask, (bit, _)| mask | (1 << bit))
    }

    /// Sample every enabled input and return the values that changed.
    pub fn sample(&mut self) -> Vec<Report, MAX_REPORTS> {
        let mut reports = Vec::new();

        for channel in 0..ANALOG_CHANNELS {
            if self.report_analog & (1 << channel) == 0 {
                continue;
            }
            let value = match self.adc.blocking_read(&mut self.analog[channel]) {
                Ok(value) => value,
                Err(e) => {
                    warn!("ADC channel {} read failed: {:?}", channel, e);
                    continue;
                }
            };
            if self.last_analog[channel] != Some(value) {
                self.last_analog[channel] = Some(value);
                let _ = reports.push(Report::Analog {
                    channel: channel as u8,
                    value,
                });
            }
        }

        if self.report_digital {
            let value = self.read_port();
            if self.last_port != Some(value) {
                self.last_port = Some(value);
                let _ = reports.push(Report::Digital { port: 0, value });
            }
        }

        reports
    }
}
