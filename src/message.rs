//! Decoded protocol messages.

use crate::command::{CommandClass, MAX_14BIT, REPORT_ANALOG, REPORT_DIGITAL};
use crate::encoder::{
    encode_analog, encode_digital_port_pair, encode_report_version, encode_set_pin_mode,
    encode_sysex, encode_system_reset, write_fixed, EncodeError,
};

/// A complete message produced by the [`FrameDecoder`](crate::FrameDecoder).
///
/// Sysex payloads borrow the decoder's accumulator and are only valid until
/// the next byte is fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message<'a> {
    /// Analog value for a channel (0-15), 14-bit value.
    Analog { channel: u8, value: u16 },
    /// Digital port pair for a port (0-15), 14-bit pin mask.
    Digital { port: u8, value: u16 },
    /// Pin mode change.
    SetPinMode { pin: u8, mode: u8 },
    /// Analog reporting toggle for a channel.
    ReportAnalog { channel: u8, enable: u8 },
    /// Digital reporting toggle for a port.
    ReportDigital { port: u8, enable: u8 },
    /// Extended command with its payload (delimiters stripped).
    Sysex { command: u8, payload: &'a [u8] },
    /// Version request.
    ReportVersion,
    /// Parser state was cleared by a system reset.
    SystemReset,
}

impl<'a> Message<'a> {
    /// Build a fixed-payload message from its class and raw arguments.
    pub(crate) const fn from_class(class: CommandClass, first: u8, second: u16) -> Self {
        match class {
            CommandClass::Analog => Self::Analog {
                channel: first,
                value: second,
            },
            CommandClass::Digital => Self::Digital {
                port: first,
                value: second,
            },
            CommandClass::SetPinMode => Self::SetPinMode {
                pin: first,
                mode: second as u8,
            },
            CommandClass::ReportAnalog => Self::ReportAnalog {
                channel: first,
                enable: second as u8,
            },
            CommandClass::ReportDigital => Self::ReportDigital {
                port: first,
                enable: second as u8,
            },
        }
    }

    /// The handler slot this message is routed to, if any.
    #[must_use]
    pub const fn class(&self) -> Option<CommandClass> {
        match self {
            Self::Analog { .. } => Some(CommandClass::Analog),
            Self::Digital { .. } => Some(CommandClass::Digital),
            Self::SetPinMode { .. } => Some(CommandClass::SetPinMode),
            Self::ReportAnalog { .. } => Some(CommandClass::ReportAnalog),
            Self::ReportDigital { .. } => Some(CommandClass::ReportDigital),
            Self::Sysex { .. } | Self::ReportVersion | Self::SystemReset => None,
        }
    }

    /// The two handler arguments for fixed-payload messages.
    #[must_use]
    pub const fn handler_args(&self) -> Option<(u8, u16)> {
        match *self {
            Self::Analog { channel, value } => Some((channel, value)),
            Self::Digital { port, value } => Some((port, value)),
            Self::SetPinMode { pin, mode } => Some((pin, mode as u16)),
            Self::ReportAnalog { channel, enable } => Some((channel, enable as u16)),
            Self::ReportDigital { port, enable } => Some((port, enable as u16)),
            Self::Sysex { .. } | Self::ReportVersion | Self::SystemReset => None,
        }
    }

    /// Encode this message back into wire form.
    ///
    /// Returns the number of bytes written. Reporting toggles keep their
    /// `enable` byte as received (masked to 7 bits).
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::BufferTooSmall`] if `buf` cannot hold the message.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        match *self {
            Self::Analog { channel, value } => {
                write_fixed(&encode_analog(channel, value & MAX_14BIT), buf)
            }
            Self::Digital { port, value } => {
                write_fixed(&encode_digital_port_pair(port, value & MAX_14BIT), buf)
            }
            Self::SetPinMode { pin, mode } => write_fixed(&encode_set_pin_mode(pin, mode), buf),
            Self::ReportAnalog { channel, enable } => {
                write_fixed(&[REPORT_ANALOG | (channel & 0x0F), enable & 0x7F], buf)
            }
            Self::ReportDigital { port, enable } => {
                write_fixed(&[REPORT_DIGITAL | (port & 0x0F), enable & 0x7F], buf)
            }
            Self::Sysex { command, payload } => encode_sysex(command, payload, buf),
            Self::ReportVersion => write_fixed(&encode_report_version(), buf),
            Self::SystemReset => write_fixed(&encode_system_reset(), buf),
        }
    }
}
